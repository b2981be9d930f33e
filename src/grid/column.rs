use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::data::record::Record;
use crate::data::value::{CellValue, ValueKind};
use crate::grid::view_state::SortDirection;

/// How a column's cells are displayed and edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Dropdown,
    #[serde(alias = "multi-dropdown")]
    Multidropdown,
    Custom,
}

/// Value of a dropdown option, either a string or an integer id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Integer(i64),
    Text(String),
}

impl OptionValue {
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            OptionValue::Integer(i) => CellValue::Integer(*i),
            OptionValue::Text(s) => CellValue::Text(s.clone()),
        }
    }

    /// Strict equality against a cell value (no string/number coercion)
    pub fn matches(&self, value: &CellValue) -> bool {
        match (self, value) {
            (OptionValue::Integer(a), CellValue::Integer(b)) => a == b,
            (OptionValue::Integer(a), CellValue::Float(b)) => (*a as f64) == *b,
            (OptionValue::Text(a), CellValue::Text(b)) | (OptionValue::Text(a), CellValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One choice offered by a dropdown editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: OptionValue,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: OptionValue::Text(value.into()),
            label: label.into(),
        }
    }

    pub fn numeric(value: i64, label: impl Into<String>) -> Self {
        Self {
            value: OptionValue::Integer(value),
            label: label.into(),
        }
    }
}

/// One value offered by a column filter panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Builtin footer aggregates over the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterAggregate {
    Count,
    Sum,
    Average,
    Min,
    Max,
}

type RenderFn = dyn Fn(&CellValue, &Record, usize) -> String + Send + Sync;
type FooterFn = dyn Fn(&[&Record]) -> String + Send + Sync;

/// Caller-supplied cell renderer: (value, row, view position) -> text
#[derive(Clone)]
pub struct CellRenderer(Arc<RenderFn>);

impl CellRenderer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CellValue, &Record, usize) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn render(&self, value: &CellValue, row: &Record, position: usize) -> String {
        (self.0)(value, row, position)
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellRenderer(..)")
    }
}

/// Caller-supplied footer: rows of the current view -> text
#[derive(Clone)]
pub struct FooterRenderer(Arc<FooterFn>);

impl FooterRenderer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[&Record]) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn render(&self, rows: &[&Record]) -> String {
        (self.0)(rows)
    }
}

impl fmt::Debug for FooterRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FooterRenderer(..)")
    }
}

/// Static description of one grid column.
/// Immutable once handed to a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,

    #[serde(default)]
    pub header: String,

    #[serde(default, rename = "type")]
    pub column_type: ColumnType,

    #[serde(default)]
    pub sortable: bool,

    #[serde(default)]
    pub filterable: bool,

    #[serde(default)]
    pub editable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_options: Vec<FilterOption>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropdown_options: Vec<SelectOption>,

    /// Fixed display width in terminal cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,

    /// Hidden until the user shows it
    #[serde(default)]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<FooterAggregate>,

    #[serde(skip)]
    pub renderer: Option<CellRenderer>,

    #[serde(skip)]
    pub footer_renderer: Option<FooterRenderer>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            column_type: ColumnType::Text,
            sortable: false,
            filterable: false,
            editable: false,
            filter_options: Vec::new(),
            dropdown_options: Vec::new(),
            width: None,
            hidden: false,
            footer: None,
            renderer: None,
            footer_renderer: None,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn filterable(mut self, options: Vec<FilterOption>) -> Self {
        self.filterable = true;
        self.filter_options = options;
        self
    }

    pub fn with_dropdown_options(mut self, options: Vec<SelectOption>) -> Self {
        self.dropdown_options = options;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_footer(mut self, footer: FooterAggregate) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_footer_renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&[&Record]) -> String + Send + Sync + 'static,
    {
        self.footer_renderer = Some(FooterRenderer::new(f));
        self
    }

    pub fn with_renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellValue, &Record, usize) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(CellRenderer::new(f));
        self
    }

    /// Header text, falling back to the key
    pub fn title(&self) -> &str {
        if self.header.is_empty() {
            &self.key
        } else {
            &self.header
        }
    }

    pub fn has_footer(&self) -> bool {
        self.footer.is_some() || self.footer_renderer.is_some()
    }

    pub fn find_option(&self, value: &CellValue) -> Option<&SelectOption> {
        self.dropdown_options.iter().find(|opt| opt.value.matches(value))
    }
}

/// Default sort as written in a spec file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSort {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Column specs plus grid-level options, loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<DefaultSort>,

    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl GridSpec {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read column spec file: {:?}", path.as_ref()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let spec: GridSpec = toml::from_str(contents).context("Invalid column spec file")?;
        Ok(spec)
    }
}

/// Derive plain column specs from record fields. Types come from the first
/// non-null value of each field; every column sorts and all but the key edit.
pub fn infer_columns(fields: &[String], records: &[Record], key_field: &str) -> Vec<ColumnSpec> {
    fields
        .iter()
        .map(|field| {
            let kind = records
                .iter()
                .map(|r| r.value(field))
                .find(|v| !v.is_null())
                .map(CellValue::kind)
                .unwrap_or(ValueKind::Text);

            let column_type = match kind {
                ValueKind::Integer | ValueKind::Float => ColumnType::Number,
                ValueKind::Boolean => ColumnType::Boolean,
                ValueKind::Date => ColumnType::Date,
                _ => ColumnType::Text,
            };

            let mut spec = ColumnSpec::new(field.clone(), field.clone())
                .with_type(column_type)
                .sortable();
            // Lists have no editor without option lists
            if field != key_field && kind != ValueKind::List {
                spec = spec.editable();
            }
            spec
        })
        .collect()
}
