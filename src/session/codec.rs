//! Delimiter-joined path lists.
//!
//! Paths are joined with `,`. A literal `,` or `\` inside a path is written
//! as `\,` or `\\` so that splitting gives back exactly what was joined.
//! Lists written without escaping still decode: a backslash followed by any
//! other character is kept as-is.

const DELIMITER: char = ',';
const ESCAPE: char = '\\';

/// Join paths into a single store value.
pub fn join_paths<S: AsRef<str>>(paths: &[S]) -> String {
    let mut out = String::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        for c in path.as_ref().chars() {
            if c == DELIMITER || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

/// Split a store value back into paths. Empty segments are dropped.
pub fn split_paths(value: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.peek() {
                Some(&next) if next == DELIMITER || next == ESCAPE => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(ESCAPE),
            },
            DELIMITER => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_plain_paths() {
        let joined = join_paths(&["/notes/a.md", "/notes/b.md"]);
        assert_eq!(joined, "/notes/a.md,/notes/b.md");
    }

    #[test]
    fn test_split_plain_paths() {
        assert_eq!(
            split_paths("/notes/a.md,/notes/b.md"),
            vec!["/notes/a.md".to_string(), "/notes/b.md".to_string()]
        );
    }

    #[test]
    fn test_commas_and_backslashes_survive() {
        let paths = vec![
            "/notes/one, two.md".to_string(),
            r"C:\notes\three.md".to_string(),
            r"trailing\".to_string(),
        ];
        assert_eq!(split_paths(&join_paths(&paths)), paths);
    }

    #[test]
    fn test_unescaped_backslashes_decode_literally() {
        assert_eq!(
            split_paths(r"C:\notes\a.md,C:\notes\b.md"),
            vec![r"C:\notes\a.md".to_string(), r"C:\notes\b.md".to_string()]
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert!(split_paths("").is_empty());
        assert_eq!(
            split_paths(",/a.md,,/b.md,"),
            vec!["/a.md".to_string(), "/b.md".to_string()]
        );
    }

    #[test]
    fn test_join_empty_list() {
        let empty: [&str; 0] = [];
        assert_eq!(join_paths(&empty), "");
    }
}
