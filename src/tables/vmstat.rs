/// Raw `vm_stat` output, kept line by line
///
/// Only a prefix of the lines is shown to the user; the `Key: value.`
/// counters are parsed on demand for log output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmStats {
    lines: Vec<String>,
}

impl VmStats {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// First `n` lines, fewer if the file is shorter
    pub fn head(&self, n: usize) -> &[String] {
        &self.lines[..n.min(self.lines.len())]
    }

    /// Page size from the `(page size of N bytes)` banner
    pub fn page_size(&self) -> Option<u64> {
        self.lines.iter().find_map(|line| {
            let rest = line.split("page size of").nth(1)?;
            rest.split_whitespace().next()?.parse().ok()
        })
    }

    /// Counters of the form `Pages free:   12345.`
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.lines
            .iter()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let value = value.trim().trim_end_matches('.').parse().ok()?;
                Some((key.trim().trim_matches('"').to_string(), value))
            })
            .collect()
    }

    /// Look up one counter by name, ignoring case
    ///
    /// # Arguments
    ///
    /// * `key` - Counter name without the trailing colon, e.g. `Pages free`
    ///
    /// # Returns
    ///
    /// `Some(value)` for the first matching counter, `None` if absent
    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Free memory in bytes, if both the counter and page size are present
    pub fn free_bytes(&self) -> Option<u64> {
        self.get("Pages free")?.checked_mul(self.page_size()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Mach Virtual Memory Statistics: (page size of 16384 bytes)
Pages free:                               10000.
Pages active:                            234567.
Pages inactive:                          220000.
Pages speculative:                         1234.
Pages throttled:                              0.
Pages wired down:                         98765.
Pages purgeable:                           4321.
\"Translation faults\":                  123456789.
Pages copy-on-write:                    7654321.
Pages zero filled:                     87654321.
Pages reactivated:                        11111.
";

    #[test]
    fn test_head_limits_lines() {
        let stats = VmStats::parse(SAMPLE);
        assert_eq!(stats.lines().len(), 12);
        assert_eq!(stats.head(10).len(), 10);
        assert!(stats.head(10)[0].starts_with("Mach Virtual Memory Statistics"));
        assert_eq!(stats.head(100).len(), 12);
    }

    #[test]
    fn test_page_size_and_entries() {
        let stats = VmStats::parse(SAMPLE);

        assert_eq!(stats.page_size(), Some(16384));
        assert_eq!(stats.get("Pages free"), Some(10000));
        assert_eq!(stats.get("Translation faults"), Some(123456789));
        assert_eq!(stats.entries().len(), 11);
        assert_eq!(stats.free_bytes(), Some(10000 * 16384));
    }

    #[test]
    fn test_missing_banner() {
        let stats = VmStats::parse("Pages free: 5.\n");
        assert_eq!(stats.page_size(), None);
        assert_eq!(stats.free_bytes(), None);
        assert_eq!(stats.get("pages free"), Some(5));
    }

    #[test]
    fn test_empty_file() {
        let stats = VmStats::parse("");
        assert!(stats.head(10).is_empty());
        assert!(stats.entries().is_empty());
    }
}
