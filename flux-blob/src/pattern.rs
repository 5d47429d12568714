/// Wildcard pattern over chunk names: `*` matches any run, `?` matches one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPattern {
    pattern: Vec<char>,
}

impl ChunkPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
        }
    }

    /// Check a bare name (no directory part) against the pattern
    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let (mut p, mut n) = (0, 0);
        let mut backtrack: Option<(usize, usize)> = None;

        while n < name.len() {
            match self.pattern.get(p).copied() {
                Some('*') => {
                    backtrack = Some((p, n));
                    p += 1;
                }
                Some(c) if c == '?' || c == name[n] => {
                    p += 1;
                    n += 1;
                }
                _ => match backtrack {
                    Some((star, matched)) => {
                        p = star + 1;
                        n = matched + 1;
                        backtrack = Some((star, matched + 1));
                    }
                    None => return false,
                },
            }
        }

        self.pattern[p..].iter().all(|&c| c == '*')
    }
}

impl From<&str> for ChunkPattern {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ChunkPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pattern.iter().collect::<String>())
    }
}
