use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use ipmimonitoring::{SensorReading, SensorRecord};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// How records are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON array of records, compact unless an indent is given.
    Json { indent: Option<usize> },
    /// A table of formatted cells.
    Table(TableFormat),
}

/// Table flavours for `--table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Text,
    Html,
    Json,
    Csv,
    Latex,
    Mediawiki,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

const COLUMNS: [(&str, Align); 12] = [
    ("Num", Align::Right),
    ("Event", Align::Right),
    ("Sensor", Align::Right),
    ("Sensor Name", Align::Left),
    ("Sensor Type", Align::Left),
    ("State", Align::Left),
    ("Reading", Align::Right),
    ("Units", Align::Left),
    ("Type", Align::Left),
    ("Bitmask", Align::Right),
    ("Bitmask Type", Align::Left),
    ("Bitmask Strings", Align::Left),
];

type Row = [String; 12];

impl OutputFormat {
    /// Render `records` as one block of output (no trailing newline).
    pub fn render(self, records: &[SensorRecord]) -> Result<String> {
        match self {
            Self::Json { indent } => render_json(records, indent),
            Self::Table(format) => render_table(records, format),
        }
    }
}

fn render_json(records: &[SensorRecord], indent: Option<usize>) -> Result<String> {
    let Some(indent) = indent else {
        return Ok(serde_json::to_string(records)?);
    };
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

fn render_table(records: &[SensorRecord], format: TableFormat) -> Result<String> {
    let rows: Vec<Row> = records.iter().map(cells).collect();
    Ok(match format {
        TableFormat::Text => text_table(&rows),
        TableFormat::Html => html_table(&rows),
        TableFormat::Json => json_table(&rows)?,
        TableFormat::Csv => csv_table(&rows),
        TableFormat::Latex => latex_table(&rows),
        TableFormat::Mediawiki => mediawiki_table(&rows),
    })
}

fn cells(record: &SensorRecord) -> Row {
    [
        record.record_id.to_string(),
        format!("{:#04x}", record.event_reading_type_code),
        record.sensor_number.to_string(),
        record.name.clone(),
        record.sensor_type.to_string(),
        record.state.to_string(),
        record.reading.as_ref().map(reading_cell).unwrap_or_default(),
        record.units.to_string(),
        record.reading_type.to_string(),
        format!("{:#04x}", record.bitmask),
        record.bitmask_type.to_string(),
        record.bitmask_strings.join(", "),
    ]
}

fn reading_cell(reading: &SensorReading) -> String {
    match reading {
        SensorReading::Double(v) => format!("{v:.2}"),
        other => other.to_string(),
    }
}

fn text_table(rows: &[Row]) -> String {
    let mut widths: Vec<usize> = COLUMNS.iter().map(|(name, _)| name.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut border = String::from("+");
    for width in &widths {
        border.push_str(&"-".repeat(width + 2));
        border.push('+');
    }

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(border.clone());
    out.push(text_line(
        COLUMNS.iter().map(|(name, _)| (*name, None)),
        &widths,
    ));
    out.push(border.clone());
    for row in rows {
        out.push(text_line(
            row.iter().zip(COLUMNS).map(|(cell, (_, align))| (cell.as_str(), Some(align))),
            &widths,
        ));
    }
    out.push(border);
    out.join("\n")
}

// `None` centres the cell (headers).
fn text_line<'a>(cells: impl Iterator<Item = (&'a str, Option<Align>)>, widths: &[usize]) -> String {
    let mut out = String::from("|");
    for ((cell, align), width) in cells.zip(widths) {
        let _ = match align {
            Some(Align::Left) => write!(out, " {cell:<width$} |"),
            Some(Align::Right) => write!(out, " {cell:>width$} |"),
            None => write!(out, " {cell:^width$} |"),
        };
    }
    out
}

fn html_table(rows: &[Row]) -> String {
    let mut out = String::from("<table>\n    <thead>\n        <tr>\n");
    for (name, _) in COLUMNS {
        let _ = writeln!(out, "            <th>{}</th>", html_escape(name));
    }
    out.push_str("        </tr>\n    </thead>\n    <tbody>\n");
    for row in rows {
        out.push_str("        <tr>\n");
        for cell in row {
            let _ = writeln!(out, "            <td>{}</td>", html_escape(cell));
        }
        out.push_str("        </tr>\n");
    }
    out.push_str("    </tbody>\n</table>");
    out
}

fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

// First element lists the headers, then one object per row keyed by header.
fn json_table(rows: &[Row]) -> Result<String> {
    let headers: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
    let mut items = vec![serde_json::to_value(headers)?];
    for row in rows {
        let object: BTreeMap<&str, &str> = COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .zip(row.iter().map(String::as_str))
            .collect();
        items.push(serde_json::to_value(object)?);
    }
    Ok(serde_json::to_string_pretty(&items)?)
}

fn csv_table(rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(COLUMNS.iter().map(|(name, _)| *name)));
    for row in rows {
        lines.push(csv_line(row.iter().map(String::as_str)));
    }
    lines.join("\n")
}

fn csv_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .map(|cell| {
            if cell.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn latex_table(rows: &[Row]) -> String {
    let alignment: String = COLUMNS
        .iter()
        .map(|(_, align)| match align {
            Align::Left => 'l',
            Align::Right => 'r',
        })
        .collect();
    let mut out = format!("\\begin{{tabular}}{{{alignment}}}\n");
    let header: Vec<String> = COLUMNS.iter().map(|(name, _)| latex_escape(name)).collect();
    let _ = writeln!(out, "{} \\\\", header.join(" & "));
    out.push_str("\\hline\n");
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| latex_escape(cell)).collect();
        let _ = writeln!(out, "{} \\\\", cells.join(" & "));
    }
    out.push_str("\\end{tabular}");
    out
}

fn latex_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            c => out.push(c),
        }
    }
    out
}

fn mediawiki_table(rows: &[Row]) -> String {
    let mut out = String::from("{| class=\"wikitable\"\n|-\n");
    let headers: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
    let _ = writeln!(out, "! {}", headers.join(" !! "));
    for row in rows {
        out.push_str("|-\n");
        let _ = writeln!(out, "| {}", row.join(" || "));
    }
    out.push_str("|}");
    out
}

#[cfg(test)]
mod tests {
    use ipmimonitoring::{
        SensorBitmaskType, SensorReadingType, SensorState, SensorType, SensorUnits,
    };

    use super::*;

    fn temperature() -> SensorRecord {
        SensorRecord {
            record_id: 5,
            event_reading_type_code: 0x01,
            sensor_number: 48,
            name: "CPU Temp".to_owned(),
            sensor_type: SensorType::Temperature,
            state: SensorState::Nominal,
            reading_type: SensorReadingType::Double,
            reading: Some(SensorReading::Double(42.5)),
            units: SensorUnits::Celsius,
            bitmask_type: SensorBitmaskType::Threshold,
            bitmask: 0xc0,
            bitmask_strings: vec!["OK".to_owned()],
        }
    }

    fn presence() -> SensorRecord {
        SensorRecord {
            record_id: 9,
            event_reading_type_code: 0x6f,
            sensor_number: 3,
            name: "PS1 Status".to_owned(),
            sensor_type: SensorType::PowerSupply,
            state: SensorState::Warning,
            reading_type: SensorReadingType::Unknown,
            reading: None,
            units: SensorUnits::None,
            bitmask_type: SensorBitmaskType::PowerSupply,
            bitmask: 0x01,
            bitmask_strings: vec!["Presence detected".to_owned(), "Failure".to_owned()],
        }
    }

    #[test]
    fn cells_follow_column_formatting() {
        let row = cells(&temperature());
        assert_eq!(row[0], "5");
        assert_eq!(row[1], "0x01");
        assert_eq!(row[4], "TEMPERATURE");
        assert_eq!(row[6], "42.50");
        assert_eq!(row[9], "0xc0");

        let row = cells(&presence());
        assert_eq!(row[6], "");
        assert_eq!(row[11], "Presence detected, Failure");
    }

    #[test]
    fn text_table_aligns_columns() {
        let out = render_table(&[temperature(), presence()], TableFormat::Text).expect("render");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("+-----+"));
        assert!(lines[1].starts_with("| Num |"));
        assert!(lines[3].starts_with("|   5 |  0x01 |"));
        assert!(lines[3].contains("| CPU Temp    |"));
        assert!(lines[3].contains("|   42.50 |"));
        let width = lines[0].len();
        assert!(lines.iter().all(|line| line.len() == width));
    }

    #[test]
    fn empty_table_keeps_headers() {
        let out = render_table(&[], TableFormat::Text).expect("render");
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("Bitmask Strings"));
    }

    #[test]
    fn csv_quotes_cells_with_commas() {
        let out = render_table(&[presence()], TableFormat::Csv).expect("render");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].split(',').count(), 12);
        assert!(lines[1].ends_with(",\"Presence detected, Failure\""));
    }

    #[test]
    fn markup_tables_escape_cells() {
        let mut record = temperature();
        record.name = "A&B_<1>".to_owned();
        let html = render_table(&[record.clone()], TableFormat::Html).expect("render");
        assert!(html.contains("<td>A&amp;B_&lt;1&gt;</td>"));
        let latex = render_table(&[record], TableFormat::Latex).expect("render");
        assert!(latex.starts_with("\\begin{tabular}{rrrlllrllrll}"));
        assert!(latex.contains("A\\&B\\_<1>"));

        let wiki = render_table(&[presence()], TableFormat::Mediawiki).expect("render");
        assert!(wiki.starts_with("{| class=\"wikitable\""));
        assert!(wiki.contains("| 9 || 0x6f || 3 || PS1 Status"));
        assert!(wiki.ends_with("|}"));
    }

    #[test]
    fn json_table_lists_headers_then_rows() {
        let out = render_table(&[temperature()], TableFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value[0][0], "Num");
        assert_eq!(value[1]["Sensor Name"], "CPU Temp");
        assert_eq!(value[1]["Reading"], "42.50");
    }

    #[test]
    fn json_output_uses_record_keys() {
        let out = OutputFormat::Json { indent: None }
            .render(&[temperature(), presence()])
            .expect("render");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value[0]["record_id"], 5);
        assert_eq!(value[0]["sensor_name"], "CPU Temp");
        assert_eq!(value[0]["sensor_type"], "TEMPERATURE");
        assert_eq!(value[0]["sensor_reading"], 42.5);
        assert_eq!(value[0]["sensor_units"], "CELSIUS");
        assert!(value[1]["sensor_reading"].is_null());
        assert_eq!(value[1]["sensor_bitmask_strings"][1], "Failure");
        assert!(!out.contains('\n'));

        let pretty = OutputFormat::Json { indent: Some(2) }
            .render(&[temperature()])
            .expect("render");
        assert!(pretty.contains("\n  {\n    \"record_id\": 5,"));
    }

    #[test]
    fn unrecognized_reading_renders_placeholder() {
        let mut record = temperature();
        record.reading_type = SensorReadingType::Unknown;
        record.reading = Some(SensorReading::Unrecognized(3));
        assert_eq!(cells(&record)[6], "unknown_type(3)");
        let out = OutputFormat::Json { indent: None }
            .render(&[record])
            .expect("render");
        assert!(out.contains("\"sensor_reading\":\"unknown_type(3)\""));
    }
}
