//! Tool-specific command-line options, kept as an ordered flag → value list.

/// One flag, with its value when it takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOption {
    pub flag: String,
    pub value: Option<String>,
}

/// Ordered set of command-line options. A flag appears at most once.
///
/// # Example
/// ```
/// use riseclipse_e::e_options::OptionList;
///
/// let mut options = OptionList::new();
/// options.add("--xml-schema", Some("a.xsd"));
/// options.add("--make-explicit-links", None::<&str>);
/// options.add("--xml-schema", Some("b.xsd"));
/// assert_eq!(
///     options.to_args(),
///     vec!["--xml-schema", "b.xsd", "--make-explicit-links"]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    entries: Vec<ToolOption>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `flag`. If it is already present, a new value replaces the old one in
    /// place and a missing value leaves the entry untouched.
    pub fn add(&mut self, flag: impl Into<String>, value: Option<impl Into<String>>) {
        let flag = flag.into();
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|o| o.flag == flag) {
            Some(existing) => {
                if value.is_some() {
                    existing.value = value;
                }
            }
            None => self.entries.push(ToolOption { flag, value }),
        }
    }

    /// Removes `flag` (and its value). Returns whether it was present.
    pub fn remove(&mut self, flag: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|o| o.flag != flag);
        before != self.entries.len()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.entries.iter().any(|o| o.flag == flag)
    }

    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|o| o.flag == flag)
            .and_then(|o| o.value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolOption> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens into command-line tokens, in insertion order.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for option in &self.entries {
            args.push(option.flag.clone());
            if let Some(value) = &option.value {
                args.push(value.clone());
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_present_flag_without_value_is_a_no_op() {
        let mut options = OptionList::new();
        options.add("--xml-schema", Some("a.xsd"));
        options.add("--xml-schema", None::<String>);
        assert_eq!(options.value_of("--xml-schema"), Some("a.xsd"));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut options = OptionList::new();
        options.add("--a", None::<String>);
        options.add("--b", Some("1"));
        options.add("--c", None::<String>);
        options.add("--b", Some("2"));
        assert_eq!(options.to_args(), vec!["--a", "--b", "2", "--c"]);
    }

    #[test]
    fn remove_drops_flag_and_value() {
        let mut options = OptionList::new();
        options.add("--xml-schema", Some("a.xsd"));
        options.add("--display-nsd-messages", None::<String>);
        assert!(options.remove("--xml-schema"));
        assert!(!options.remove("--xml-schema"));
        assert_eq!(options.to_args(), vec!["--display-nsd-messages"]);
    }
}
