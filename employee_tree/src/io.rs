//! Reads and writes the flat employee list as text, one `name,experience,salary` line per record.
//!
//! Only the records are stored, never the shape of the tree; loading is followed by a fresh
//! `Tree::build`.

use crate::data::Employee;
use crate::error::Error;

use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

// The output is wrapped in a Result to allow matching on errors
// Returns an Iterator over the raw bytes of each line, so one bad line can be skipped on its own
fn read_lines<P>(filename: P) -> io::Result<io::Split<io::BufReader<File>>>
where P: AsRef<Path>, {
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).split(b'\n'))
}

fn parse_field(line: &str, field: &str, what: &str) -> Result<i32, Error> {

    return field.trim().parse::<i32>().map_err(|e| Error::Parse {
        line: line.to_string(),
        reason: format!("bad {}: {}", what, e),
    });
}

/// Parses one line. The name runs up to the first comma, experience up to the second, and the
/// rest of the line is the salary.
pub fn parse_line(line: &str) -> Result<Employee, Error> {

    let trimmed = line.trim_end_matches(&['\r', '\n'][..]);

    let (name, rest) = match trimmed.split_once(',') {
        Some(x) => x,
        None => return Err(Error::Parse { line: line.to_string(), reason: "missing fields".to_string() }),
    };

    let (experience, salary) = match rest.split_once(',') {
        Some(x) => x,
        None => return Err(Error::Parse { line: line.to_string(), reason: "missing salary".to_string() }),
    };

    if name.is_empty() {
        return Err(Error::Parse { line: line.to_string(), reason: "empty name".to_string() });
    }

    let experience = parse_field(line, experience, "experience")?;
    let salary = parse_field(line, salary, "salary")?;

    return Ok(Employee {
        name: name.to_string(),
        experience,
        salary,
    });
}

/// Parses every well formed line and skips the rest
pub fn parse_records(contents: &str) -> Vec<Employee> {

    let mut records = Vec::new();

    for line in contents.lines() {
        push_line(&mut records, line);
    }

    return records;
}

fn push_line(records: &mut Vec<Employee>, line: &str) {

    if line.trim().is_empty() {
        return;
    }

    match parse_line(line) {
        Ok(record) => records.push(record),
        Err(e) => warn!("Skipping line: {}", e),
    }
}

pub fn format_line(record: &Employee) -> String {
    return format!("{},{},{}", record.name, record.experience, record.salary);
}

pub fn format_records(records: &[Employee]) -> String {

    let mut s = String::new();
    for record in records {
        s += &format_line(record);
        s += "\n";
    }

    return s;
}

pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Employee>, Error> {

    let mut records = Vec::new();

    for line in read_lines(path)? {
        match String::from_utf8(line?) {
            Ok(line) => push_line(&mut records, &line),
            Err(e) => warn!("Skipping line: {}", e),
        }
    }

    return Ok(records);
}

pub fn write_records<P: AsRef<Path>>(path: P, records: &[Employee]) -> Result<(), Error> {

    let mut writer = BufWriter::new(File::create(path)?);

    for record in records {
        writeln!(writer, "{}", format_line(record))?;
    }

    writer.flush()?;

    Ok(())
}
