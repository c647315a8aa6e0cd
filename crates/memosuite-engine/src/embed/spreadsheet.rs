//! Spreadsheet payloads.
//!
//! Workbooks arrive in one of two shapes depending on which editor version
//! wrote them: a sparse `celldata` list of `{r, c, v: {v, m}}` entries, or a
//! dense `data` matrix of cell objects. The shape is resolved once, here,
//! into [`SpreadsheetData`].

use serde_json::Value;

use super::EmbedError;

/// Rows shown in a preview grid.
pub const MAX_PREVIEW_ROWS: usize = 100;
/// Columns shown in a preview grid.
pub const MAX_PREVIEW_COLS: usize = 20;

/// A single cell's raw value and its formatted display text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellValue {
    /// Raw value (`v`), stringified.
    pub value: Option<String>,
    /// Display text (`m`) as formatted by the editor.
    pub display: Option<String>,
}

impl CellValue {
    /// Text shown for the cell: the display text when non-empty, else the raw value.
    pub fn text(&self) -> &str {
        self.display
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.value.as_deref())
            .unwrap_or("")
    }

    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Null => None,
            Value::Object(obj) => Some(Self {
                value: obj.get("v").and_then(scalar_text),
                display: obj.get("m").and_then(scalar_text),
            }),
            other => Some(Self {
                value: scalar_text(other),
                display: None,
            }),
        }
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One populated cell of a sparse sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseCell {
    pub r: usize,
    pub c: usize,
    pub value: CellValue,
}

/// The first sheet of a workbook, resolved to one of its storage shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetData {
    /// No sheets, or a first sheet with no cells in either shape.
    Empty,
    Sparse { cells: Vec<SparseCell> },
    Matrix { rows: Vec<Vec<Option<CellValue>>> },
}

impl SpreadsheetData {
    /// Parses a workbook payload. The payload must be a JSON array of sheets;
    /// only the first sheet is kept. When a sheet carries both shapes the
    /// matrix wins.
    pub fn parse(payload: &str) -> Result<Self, EmbedError> {
        let json: Value = serde_json::from_str(payload)?;
        let sheets = json
            .as_array()
            .ok_or_else(|| EmbedError::Shape("expected an array of sheets".to_string()))?;

        let Some(sheet) = sheets.first() else {
            return Ok(Self::Empty);
        };

        if let Some(rows) = sheet.get("data").and_then(Value::as_array)
            && !rows.is_empty()
        {
            let rows = rows
                .iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(CellValue::from_json).collect())
                        .unwrap_or_default()
                })
                .collect();
            return Ok(Self::Matrix { rows });
        }

        if let Some(cells) = sheet.get("celldata").and_then(Value::as_array)
            && !cells.is_empty()
        {
            let cells = cells.iter().filter_map(sparse_cell).collect();
            return Ok(Self::Sparse { cells });
        }

        Ok(Self::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Lays the sheet out as a dense grid of display strings, clipped to
    /// `max_rows` by `max_cols`.
    pub fn grid(&self, max_rows: usize, max_cols: usize) -> Grid {
        match self {
            Self::Empty => Grid::default(),
            Self::Matrix { rows } => {
                let width = rows.iter().map(Vec::len).max().unwrap_or(0);
                let (h, w) = (rows.len().min(max_rows), width.min(max_cols));
                let cells = rows
                    .iter()
                    .take(h)
                    .map(|row| {
                        (0..w)
                            .map(|c| {
                                row.get(c)
                                    .and_then(Option::as_ref)
                                    .map(|v| v.text().to_string())
                                    .unwrap_or_default()
                            })
                            .collect()
                    })
                    .collect();
                Grid {
                    rows: cells,
                    truncated: rows.len() > max_rows || width > max_cols,
                }
            }
            Self::Sparse { cells } => {
                let height = cells.iter().map(|c| c.r.saturating_add(1)).max().unwrap_or(0);
                let width = cells.iter().map(|c| c.c.saturating_add(1)).max().unwrap_or(0);
                let (h, w) = (height.min(max_rows), width.min(max_cols));
                let mut rows = vec![vec![String::new(); w]; h];
                for cell in cells.iter().filter(|c| c.r < h && c.c < w) {
                    rows[cell.r][cell.c] = cell.value.text().to_string();
                }
                Grid {
                    rows,
                    truncated: height > max_rows || width > max_cols,
                }
            }
        }
    }

    /// [`grid`](Self::grid) with the standard preview limits.
    pub fn preview_grid(&self) -> Grid {
        self.grid(MAX_PREVIEW_ROWS, MAX_PREVIEW_COLS)
    }
}

fn sparse_cell(v: &Value) -> Option<SparseCell> {
    let r = usize::try_from(v.get("r")?.as_u64()?).ok()?;
    let c = usize::try_from(v.get("c")?.as_u64()?).ok()?;
    let value = CellValue::from_json(v.get("v")?)?;
    Some(SparseCell { r, c, value })
}

/// Dense display grid for a preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
    /// The sheet has more rows or columns than the grid shows.
    pub truncated: bool,
}

impl Grid {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, r: usize, c: usize) -> Option<&str> {
        self.rows.get(r)?.get(c).map(String::as_str)
    }

    /// Renders the grid as an HTML table with spreadsheet-style headers.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"spreadsheet-preview\"><thead><tr><th>#</th>");
        for c in 0..self.width() {
            html.push_str(&format!("<th>{}</th>", column_label(c)));
        }
        html.push_str("</tr></thead><tbody>");
        for (r, row) in self.rows.iter().enumerate() {
            html.push_str(&format!("<tr><td>{}</td>", r + 1));
            for value in row {
                html.push_str(&format!("<td>{}</td>", html_escape::encode_text(value)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Spreadsheet column label: `A`..`Z`, then `AA`, `AB`, ...
pub fn column_label(mut c: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (c % 26) as u8);
        if c < 26 {
            break;
        }
        c = c / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
