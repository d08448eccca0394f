use serde::{Deserialize, Serialize};

/// Column count every address row must have: ID, street, city, state, zip.
pub const ADDRESS_COLUMNS: usize = 5;

/// Column count of a geocoder response row, whichever parse path produced it.
pub const RESULT_COLUMNS: usize = 8;

/// Hard row limit of a single batch upload.
pub const MAX_BATCH_ROWS: usize = 10_000;

pub const RESULT_HEADER: [&str; RESULT_COLUMNS] = [
    "id",
    "input_address",
    "match",
    "match_type",
    "matched_address",
    "coordinates",
    "tiger_line_id",
    "side",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressRecord {
    /// Builds a record from positional fields; `None` unless there are exactly five.
    pub fn from_fields<S: Into<String>>(fields: Vec<S>) -> Option<Self> {
        let [id, street, city, state, zip]: [S; ADDRESS_COLUMNS] = fields.try_into().ok()?;
        Some(Self {
            id: id.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        })
    }

    pub fn as_row(&self) -> [&str; ADDRESS_COLUMNS] {
        [&self.id, &self.street, &self.city, &self.state, &self.zip]
    }
}

pub type AddressTable = Vec<AddressRecord>;

/// One response row. Empty fields are `None`, so a no-match row
/// (ID, input address, `No_Match`) still has eight columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub id: Option<String>,
    pub input_address: Option<String>,
    pub match_indicator: Option<String>,
    pub match_type: Option<String>,
    pub matched_address: Option<String>,
    pub coordinates: Option<String>,
    pub tiger_line_id: Option<String>,
    pub side: Option<String>,
}

impl GeocodeResult {
    pub fn from_columns(columns: [Option<String>; RESULT_COLUMNS]) -> Self {
        let [id, input_address, match_indicator, match_type, matched_address, coordinates, tiger_line_id, side] =
            columns;
        Self {
            id,
            input_address,
            match_indicator,
            match_type,
            matched_address,
            coordinates,
            tiger_line_id,
            side,
        }
    }

    pub fn columns(&self) -> [Option<&str>; RESULT_COLUMNS] {
        [
            self.id.as_deref(),
            self.input_address.as_deref(),
            self.match_indicator.as_deref(),
            self.match_type.as_deref(),
            self.matched_address.as_deref(),
            self.coordinates.as_deref(),
            self.tiger_line_id.as_deref(),
            self.side.as_deref(),
        ]
    }

    pub fn to_row(&self) -> [&str; RESULT_COLUMNS] {
        self.columns().map(|column| column.unwrap_or(""))
    }

    pub fn match_kind(&self) -> MatchKind {
        match self.match_type.as_deref() {
            Some("Exact") => MatchKind::Exact,
            Some("Non_Exact") => MatchKind::NonExact,
            None => MatchKind::Missing,
            Some(_) => MatchKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    NonExact,
    Missing,
    Other,
}

pub type ResultTable = Vec<GeocodeResult>;
