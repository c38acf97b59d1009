#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

/// Scratch directory holding the two record populations for one test case.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates empty `descriptions/` and `locale_prices/` directories.
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("temp dir");
        fs::create_dir(temp_dir.path().join("descriptions")).expect("descriptions dir");
        fs::create_dir(temp_dir.path().join("locale_prices")).expect("locale prices dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn descriptions(&self) -> PathBuf {
        self.path().join("descriptions")
    }

    pub fn locale_prices(&self) -> PathBuf {
        self.path().join("locale_prices")
    }

    pub fn write_description(&self, file_name: &str, record: Value) -> PathBuf {
        write_json(&self.descriptions().join(file_name), &record)
    }

    pub fn write_locale_price(&self, file_name: &str, record: Value) -> PathBuf {
        write_json(&self.locale_prices().join(file_name), &record)
    }

    /// Writes `contents` into a file at the workspace root and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}

fn write_json(path: &Path, record: &Value) -> PathBuf {
    fs::write(path, serde_json::to_vec_pretty(record).expect("serialize record"))
        .expect("write record");
    path.to_path_buf()
}

/// A set-description record using that population's native field names.
pub fn description(prod_id: i64, name: &str, pieces: i64, price: f64, ages: &str) -> Value {
    json!({
        "prod_id": prod_id,
        "set": name,
        "theme": "City",
        "prod_short_desc": format!("{name} building set"),
        "piece_count": pieces,
        "list_price": price,
        "country": "US",
        "ages": ages,
        "num_reviews": 4,
        "review_difficulty": if pieces < 300 { "Easy" } else { "Challenging" },
        "play_star_rating": 4.5,
        "val_star_rating": 4.0,
        "star_rating": 4.3
    })
}

/// A locale-price record using that population's native field names. The
/// product id and country come from the file name.
pub fn locale_price(name: &str, pieces: i64, price: f64, ages: &str) -> Value {
    json!({
        "set_name": name,
        "theme_name": "Technic",
        "prod_desc": format!("{name} for builders"),
        "piece_count": pieces,
        "list_price": price,
        "ages": ages,
        "num_reviews": 2,
        "review_difficulty": if pieces < 300 { "Easy" } else { "Challenging" },
        "play_rating": 3.5,
        "value_rating": 3.0,
        "overall_rating": 3.8
    })
}

/// Populates a workspace with a small, realistic input set containing one
/// exact duplicate, an open-ended and a half-year age range, and nulls in
/// every imputed column.
pub fn seed_inputs(ws: &TestWorkspace) {
    ws.write_description("a_6001.json", description(6001, "Fire Station", 509, 59.99, "6-12"));
    ws.write_description("a_6002.json", description(6002, "Police Car", 95, 9.99, "5+"));
    ws.write_description("a_6003.json", description(6003, "Toddler Bus", 40, 19.99, "1½-3"));

    let mut missing_reviews = description(6004, "Cargo Train", 1226, 199.99, "6-12");
    missing_reviews["num_reviews"] = Value::Null;
    missing_reviews["theme"] = Value::Null;
    ws.write_description("a_6004.json", missing_reviews);

    let mut missing_difficulty = description(6005, "Mega Crane", 1400, 219.99, "10-16");
    missing_difficulty["review_difficulty"] = Value::Null;
    missing_difficulty["prod_short_desc"] = Value::Null;
    ws.write_description("a_6005.json", missing_difficulty);

    // Exact repeat of the Fire Station listing.
    ws.write_description("a_6006.json", description(6001, "Fire Station", 509, 59.99, "6-12"));

    ws.write_locale_price("42100_DE.json", locale_price("Excavator", 4108, 449.99, "12+"));
    ws.write_locale_price("42101_DE.json", locale_price("Buggy", 117, 9.99, "7-14"));

    let mut borrow = locale_price("Race Car", 250, 29.99, "8-14");
    borrow["play_rating"] = Value::Null;
    borrow["value_rating"] = Value::Null;
    ws.write_locale_price("42102_GB.json", borrow);

    let mut all_missing = locale_price("Dump Truck", 300, 39.99, "9-16");
    all_missing["play_rating"] = Value::Null;
    all_missing["value_rating"] = Value::Null;
    all_missing["overall_rating"] = Value::Null;
    ws.write_locale_price("42103_GB.json", all_missing);
}
