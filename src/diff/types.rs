use super::DiffError;

/// Marker that opens a hunk inside a file section.
pub const HUNK_HEADER: &str = "@@";

/// One changed file from a unified diff.
///
/// Built once from the contiguous slice of raw lines starting at its
/// `diff --git` header and immutable afterwards.
#[derive(Debug, Clone)]
pub struct FileDiff {
    /// Base name of the file (path stripped), e.g. "Foo.m"
    name: String,
    /// Text after the last '.' of the name, or the whole name when there is none
    extension: String,
    /// Hunks in diff order
    hunks: Vec<Hunk>,
}

/// One contiguous changed region within a file.
#[derive(Debug, Clone)]
pub struct Hunk {
    /// Original diff lines, header included
    raw_lines: Vec<String>,
    /// First post-change line number, taken from the header's `+` field
    starting_line_number: usize,
    /// Post-change lines: context and additions, addition marker stripped
    added_lines: Vec<String>,
}

impl FileDiff {
    /// Build a file from its section of the diff. The first line is the
    /// file header; lines before the first hunk header are metadata and are
    /// not part of any hunk.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<FileDiff, DiffError> {
        let header = lines.first().map(|line| line.as_ref()).unwrap_or_default();
        let name = file_name(header);
        let extension = extension(&name);

        let mut hunk_lines: Vec<Vec<String>> = Vec::new();
        for line in lines {
            let line = line.as_ref();
            if line.starts_with(HUNK_HEADER) {
                hunk_lines.push(Vec::new());
            }
            if let Some(current) = hunk_lines.last_mut() {
                current.push(line.to_string());
            }
        }

        let hunks = hunk_lines
            .into_iter()
            .map(Hunk::from_lines)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| DiffError::File {
                file: name.clone(),
                source: Box::new(source),
            })?;

        Ok(FileDiff {
            name,
            extension,
            hunks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }
}

impl Hunk {
    /// Build a hunk from its raw lines; the first line must be a hunk header
    /// carrying a `+<new_start>` field.
    pub fn from_lines(raw_lines: Vec<String>) -> Result<Hunk, DiffError> {
        let header = raw_lines.first().map(String::as_str).unwrap_or_default();
        let starting_line_number = parse_new_start(header)
            .ok_or_else(|| DiffError::MalformedHunkHeader(strip_terminator(header).to_string()))?;
        let added_lines = extract_added_lines(&raw_lines);
        if starting_line_number.checked_add(added_lines.len()).is_none() {
            return Err(DiffError::MalformedHunkHeader(strip_terminator(header).to_string()));
        }

        Ok(Hunk {
            raw_lines,
            starting_line_number,
            added_lines,
        })
    }

    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    pub fn starting_line_number(&self) -> usize {
        self.starting_line_number
    }

    pub fn added_lines(&self) -> &[String] {
        &self.added_lines
    }

    /// Post-change line number of `added_lines()[index]`.
    ///
    /// Only exact when the diff carries no elided region inside the hunk,
    /// which holds for hunks produced by a unified diff.
    pub fn line_number(&self, index: usize) -> usize {
        self.starting_line_number + index
    }

    /// All added lines joined with no separator. Each line keeps its own
    /// terminator, so the result reads like the post-change source.
    pub fn block_text(&self) -> String {
        self.added_lines.concat()
    }
}

/// Lines of a hunk minus its header and removals, one leading `+` stripped.
pub fn extract_added_lines<S: AsRef<str>>(raw_lines: &[S]) -> Vec<String> {
    raw_lines
        .iter()
        .skip(1)
        .map(|line| line.as_ref())
        .filter(|line| !line.starts_with('-'))
        .map(|line| line.strip_prefix('+').unwrap_or(line).to_string())
        .collect()
}

/// First run of digits directly after a '+' in the header.
fn parse_new_start(header: &str) -> Option<usize> {
    header.match_indices('+').find_map(|(pos, _)| {
        let rest = &header[pos + 1..];
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest, |end| &rest[..end]);
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    })
}

fn file_name(header: &str) -> String {
    let last = header.rsplit('/').next().unwrap_or(header);
    strip_terminator(last).to_string()
}

fn extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).trim().to_string()
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
