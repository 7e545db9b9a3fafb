//! Line-level conflict marker detection for locally merged files

use serde::Serialize;

/// A `<<<<<<<` ... `>>>>>>>` region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRegion {
    /// 1-based line of the `<<<<<<<` marker
    pub start_line: usize,
    /// 1-based line of the `>>>>>>>` marker
    pub end_line: usize,
    /// Label after `<<<<<<<` (usually `HEAD`)
    pub ours_label: String,
    /// Label after `>>>>>>>`
    pub theirs_label: String,
    /// Lines on our side
    pub ours: Vec<String>,
    /// Lines on their side
    pub theirs: Vec<String>,
}

#[derive(PartialEq, Eq)]
enum Side {
    Outside,
    Ours,
    Base,
    Theirs,
}

fn marker_label<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Find conflict regions in file contents
///
/// diff3-style `|||||||` base sections are skipped. An unterminated region
/// at end of file is dropped.
pub fn scan_conflict_markers(content: &str) -> Vec<ConflictRegion> {
    let mut regions = Vec::new();
    let mut side = Side::Outside;
    let mut current: Option<ConflictRegion> = None;

    for (i, line) in content.lines().enumerate() {
        let line_no = i + 1;

        if let Some(label) = marker_label(line, "<<<<<<<") {
            side = Side::Ours;
            current = Some(ConflictRegion {
                start_line: line_no,
                end_line: line_no,
                ours_label: label.to_string(),
                theirs_label: String::new(),
                ours: Vec::new(),
                theirs: Vec::new(),
            });
            continue;
        }

        let Some(region) = current.as_mut() else {
            continue;
        };

        if side != Side::Theirs && marker_label(line, "|||||||").is_some() {
            side = Side::Base;
        } else if side != Side::Theirs && line == "=======" {
            side = Side::Theirs;
        } else if let Some(label) = marker_label(line, ">>>>>>>")
            && side == Side::Theirs
        {
            region.end_line = line_no;
            region.theirs_label = label.to_string();
            if let Some(done) = current.take() {
                regions.push(done);
            }
            side = Side::Outside;
        } else {
            match side {
                Side::Ours => region.ours.push(line.to_string()),
                Side::Theirs => region.theirs.push(line.to_string()),
                Side::Base | Side::Outside => {}
            }
        }
    }

    regions
}

/// Whether the contents contain at least one complete conflict region
pub fn has_conflict_markers(content: &str) -> bool {
    !scan_conflict_markers(content).is_empty()
}
