use serde::Serialize;

/// One rule match, located at a post-change line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Base name of the file the match is in
    pub file: String,
    /// Post-change line number
    pub line: usize,
    /// Id of the rule that matched
    pub rule: String,
    /// Human-readable message from the rule
    pub message: String,
}

impl Finding {
    /// `file:line`, the form editors accept for "open at line".
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_location() {
        let finding = Finding {
            file: "Foo.m".to_string(),
            line: 3,
            rule: "comment".to_string(),
            message: "\"// x\", did you mean to leave this comment?".to_string(),
        };
        assert_eq!(finding.location(), "Foo.m:3");
    }
}
