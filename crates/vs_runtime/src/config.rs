//! Store configuration.

/// Store configuration options.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Names starting with this character mirror the process environment.
    pub env_sigil: char,
    pub mirror_environment: bool,
    pub notify_watches: bool,
    /// Bucket count for arrays created when a path write vivifies them.
    pub initial_table_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            env_sigil: '$',
            mirror_environment: true,
            notify_watches: true,
            initial_table_size: vs_core::array::TABLE_SIZE,
        }
    }
}

impl StoreConfig {
    /// The environment variable mirrored by `name`, if any. Positional and
    /// special parameters (`$1`, `$#`) never mirror.
    pub fn mirrored_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        let rest = name.strip_prefix(self.env_sigil)?;
        match rest.chars().next() {
            Some(c) if c.is_ascii_digit() || c == '#' => None,
            Some(_) => Some(rest),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_parameters_do_not_mirror() {
        let config = StoreConfig::default();
        assert_eq!(config.mirrored_name("$PATH"), Some("PATH"));
        assert_eq!(config.mirrored_name("$1"), None);
        assert_eq!(config.mirrored_name("$#"), None);
        assert_eq!(config.mirrored_name("$"), None);
        assert_eq!(config.mirrored_name("PATH"), None);
    }
}
