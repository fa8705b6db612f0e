//! Positions and skills sheets, read from CSV or TSV.

use crate::domain::model::{PositionRecord, SkillRecord};
use crate::utils::error::{CvError, Result};
use csv::StringRecord;
use regex::Regex;
use std::io::Read;
use std::sync::LazyLock;

static DESCRIPTION_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^description_(\d+)$").expect("description column pattern is valid")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"));

pub fn delimiter_for(path: &str) -> u8 {
    let is_tsv = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

struct Header {
    names: Vec<String>,
}

impl Header {
    fn new(headers: &StringRecord) -> Self {
        Self {
            names: headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
        }
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| CvError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// `description_<n>` columns ordered by `n`.
    fn descriptions(&self) -> Vec<usize> {
        let mut found: Vec<(u32, usize)> = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let caps = DESCRIPTION_COLUMN.captures(name)?;
                let n = caps[1].parse::<u32>().ok()?;
                Some((n, idx))
            })
            .collect();
        found.sort();
        found.into_iter().map(|(_, idx)| idx).collect()
    }
}

struct PositionColumns {
    section: usize,
    in_resume: usize,
    title: usize,
    location: usize,
    institution: usize,
    start: usize,
    end: usize,
    descriptions: Vec<usize>,
}

impl PositionColumns {
    fn resolve(header: &Header) -> Result<Self> {
        Ok(Self {
            section: header.require("section")?,
            in_resume: header.require("in_resume")?,
            title: header.require("title")?,
            location: header.require("loc")?,
            institution: header.require("institution")?,
            start: header.require("start")?,
            end: header.require("end")?,
            descriptions: header.descriptions(),
        })
    }
}

fn cell(row: &StringRecord, idx: usize) -> Option<String> {
    row.get(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("NA"))
        .map(String::from)
}

fn invalid(row: usize, column: &str, value: &str, reason: &str) -> CvError {
    CvError::InvalidField {
        row,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(row: usize, column: &str, value: Option<String>) -> Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(invalid(row, column, &value, "expected a true/false flag")),
    }
}

/// A four digit year, alone or inside a date such as `09/2015`. Signed or
/// shorter numbers are rejected rather than read as years.
fn parse_year(row: usize, column: &str, value: Option<String>, allow_ongoing: bool) -> Result<Option<i32>> {
    let Some(value) = value else {
        return Ok(None);
    };

    if allow_ongoing
        && matches!(
            value.to_ascii_lowercase().as_str(),
            "present" | "current" | "ongoing"
        )
    {
        return Ok(None);
    }

    if value.starts_with(['-', '+']) {
        return Err(invalid(row, column, &value, "expected a four digit year"));
    }

    YEAR.captures(&value)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| invalid(row, column, &value, "expected a four digit year"))
}

/// Reads the positions sheet. The header must carry `section`, `in_resume`,
/// `title`, `loc`, `institution`, `start` and `end`; any number of
/// `description_<n>` columns may follow.
pub fn read_positions<R: Read>(reader: R, delimiter: u8) -> Result<Vec<PositionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let header = Header::new(csv_reader.headers()?);
    let columns = PositionColumns::resolve(&header)?;
    tracing::debug!(
        "Positions sheet has {} description column(s)",
        columns.descriptions.len()
    );

    let mut records = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = result?;
        // Line numbers as seen in a spreadsheet: header is row 1.
        let row_number = idx + 2;

        let section = cell(&row, columns.section).unwrap_or_default();
        if section.is_empty() {
            tracing::warn!("Row {} has no section and will never be rendered", row_number);
        }

        records.push(PositionRecord {
            section,
            include_in_resume: parse_flag(row_number, "in_resume", cell(&row, columns.in_resume))?,
            title: cell(&row, columns.title),
            location: cell(&row, columns.location),
            institution: cell(&row, columns.institution),
            start: parse_year(row_number, "start", cell(&row, columns.start), false)?,
            end: parse_year(row_number, "end", cell(&row, columns.end), true)?,
            descriptions: columns
                .descriptions
                .iter()
                .map(|&i| cell(&row, i))
                .collect(),
        });
    }

    Ok(records)
}

pub fn read_skills<R: Read>(reader: R, delimiter: u8) -> Result<Vec<SkillRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let header = Header::new(csv_reader.headers()?);
    let skill_idx = header.require("skill")?;
    let level_idx = header.require("level")?;

    let mut skills = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = result?;
        let row_number = idx + 2;

        let Some(skill) = cell(&row, skill_idx) else {
            continue;
        };
        let raw_level = cell(&row, level_idx).unwrap_or_default();
        let level = raw_level
            .parse::<f64>()
            .map_err(|_| invalid(row_number, "level", &raw_level, "expected a number"))?;

        skills.push(SkillRecord { skill, level });
    }

    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONS: &str = "\
section,in_resume,title,loc,institution,start,end,description_1,description_2,description_3
education,TRUE,PhD Candidate,\"Nashville, TN\",Vanderbilt University,2015,2020,Working on Bayesian network models,,
industry_positions,FALSE,Data Scientist,NA,Dealer.com,09/2013,2015-06,,,
research_positions,yes,Research Assistant,Burlington,UVM,2019,current,Modeling,,Teaching
";

    #[test]
    fn test_read_positions() {
        let records = read_positions(POSITIONS.as_bytes(), b',').unwrap();
        assert_eq!(records.len(), 3);

        let phd = &records[0];
        assert_eq!(phd.section, "education");
        assert!(phd.include_in_resume);
        assert_eq!(phd.location.as_deref(), Some("Nashville, TN"));
        assert_eq!((phd.start, phd.end), (Some(2015), Some(2020)));
        assert_eq!(
            phd.descriptions,
            vec![Some("Working on Bayesian network models".to_string()), None, None]
        );

        let ds = &records[1];
        assert!(!ds.include_in_resume);
        assert_eq!(ds.location, None);
        assert_eq!((ds.start, ds.end), (Some(2013), Some(2015)));

        let ra = &records[2];
        assert_eq!(ra.end, None);
        assert_eq!(ra.descriptions[2].as_deref(), Some("Teaching"));
    }

    #[test]
    fn test_missing_required_column_fails_fast() {
        let data = "section,in_resume,title,institution,start,end\neducation,TRUE,BS,UVM,2008,2012\n";
        match read_positions(data.as_bytes(), b',') {
            Err(CvError::MissingColumn { column }) => assert_eq!(column, "loc"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_description_columns_are_ordered_by_number() {
        let data = "description_10,section,in_resume,title,loc,institution,start,end,description_2\n\
                    tenth,s,TRUE,t,l,i,2000,2001,second\n";
        let records = read_positions(data.as_bytes(), b',').unwrap();
        assert_eq!(
            records[0].descriptions,
            vec![Some("second".to_string()), Some("tenth".to_string())]
        );
    }

    #[test]
    fn test_no_description_columns_is_allowed() {
        let data = "section,in_resume,title,loc,institution,start,end\ns,TRUE,t,l,i,,2001\n";
        let records = read_positions(data.as_bytes(), b',').unwrap();
        assert!(records[0].descriptions.is_empty());
        assert_eq!(records[0].start, None);
    }

    #[test]
    fn test_bad_year_reports_row_and_column() {
        let data = "section,in_resume,title,loc,institution,start,end\ns,TRUE,t,l,i,someday,2001\n";
        match read_positions(data.as_bytes(), b',') {
            Err(CvError::InvalidField { row, column, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "start");
                assert_eq!(value, "someday");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_year_needs_four_digits() {
        for bad in ["12", "-2015", "+2015", "123456"] {
            let data = format!(
                "section,in_resume,title,loc,institution,start,end\ns,TRUE,t,l,i,{},2001\n",
                bad
            );
            match read_positions(data.as_bytes(), b',') {
                Err(CvError::InvalidField { column, value, .. }) => {
                    assert_eq!(column, "start");
                    assert_eq!(value, bad);
                }
                other => panic!("expected InvalidField for {:?}, got {:?}", bad, other),
            }
        }

        let data = "section,in_resume,title,loc,institution,start,end\ns,TRUE,t,l,i,2015,06/2019\n";
        let records = read_positions(data.as_bytes(), b',').unwrap();
        assert_eq!((records[0].start, records[0].end), (Some(2015), Some(2019)));
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let data = "section,in_resume,title,loc,institution,start,end\ns,maybe,t,l,i,2000,2001\n";
        assert!(matches!(
            read_positions(data.as_bytes(), b','),
            Err(CvError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_read_tsv_skills() {
        let data = "skill\tlevel\nR\t5\nRust\t3.5\n\t2\n";
        let skills = read_skills(data.as_bytes(), delimiter_for("skills.tsv")).unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[1].skill, "Rust");
        assert_eq!(skills[1].level, 3.5);
    }

    #[test]
    fn test_short_skill_rows_are_read_like_positions() {
        // Trailing columns omitted by the sheet export.
        let data = "skill,level,note\nR,5\nRust,3,learning\n";
        let skills = read_skills(data.as_bytes(), b',').unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].skill, "R");
        assert_eq!(skills[0].level, 5.0);

        match read_skills("skill,level\nR\n".as_bytes(), b',') {
            Err(CvError::InvalidField { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "level");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_delimiter_for_extension() {
        assert_eq!(delimiter_for("data/positions.csv"), b',');
        assert_eq!(delimiter_for("data/positions.TSV"), b'\t');
        assert_eq!(delimiter_for("positions"), b',');
    }
}
