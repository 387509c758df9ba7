//! State dropdown lookup.
//!
//! The target form encodes US states as small numeric strings in its
//! `<select>` options. The table is closed: every two-letter postal code maps
//! to exactly one form code, and anything unrecognized falls back to the
//! configured default instead of failing the record.

use phf::phf_map;

/// Postal abbreviation → form-internal option value.
pub static STATE_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "AL" => "1",
    "AK" => "2",
    "AZ" => "3",
    "AR" => "4",
    "CA" => "5",
    "CO" => "6",
    "CT" => "7",
    "DE" => "8",
    "FL" => "9",
    "GA" => "10",
    "HI" => "11",
    "ID" => "12",
    "IL" => "13",
    "IN" => "14",
    "IA" => "15",
    "KS" => "16",
    "KY" => "17",
    "LA" => "18",
    "ME" => "19",
    "MD" => "20",
    "MA" => "21",
    "MI" => "22",
    "MN" => "23",
    "MS" => "24",
    "MO" => "25",
    "MT" => "26",
    "NE" => "27",
    "NV" => "28",
    "NH" => "29",
    "NJ" => "30",
    "NM" => "31",
    "NY" => "32",
    "NC" => "33",
    "ND" => "34",
    "OH" => "35",
    "OK" => "36",
    "OR" => "37",
    "PA" => "38",
    "RI" => "39",
    "SC" => "40",
    "SD" => "41",
    "TN" => "42",
    "TX" => "43",
    "UT" => "44",
    "VT" => "45",
    "VA" => "46",
    "WA" => "47",
    "WV" => "48",
    "WI" => "49",
    "WY" => "50",
};

/// Look up a form code for a postal abbreviation.
pub fn state_code(abbr: &str) -> Option<&'static str> {
    STATE_CODES.get(abbr).copied()
}
