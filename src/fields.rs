//! Column names of the unified table.

pub const PRODUCT_ID: &str = "prod_id";
pub const SET_NAME: &str = "set_name";
pub const THEME_NAME: &str = "theme_name";
pub const PROD_SHORT_DESC: &str = "prod_short_desc";
pub const PIECE_COUNT: &str = "piece_count";
pub const LIST_PRICE: &str = "list_price";
pub const COUNTRY: &str = "country";
pub const AGES: &str = "ages";
pub const AGE_MIN: &str = "age_min";
pub const AGE_MAX: &str = "age_max";
pub const NUM_REVIEWS: &str = "num_reviews";
pub const REVIEW_DIFFICULTY: &str = "review_difficulty";
pub const PLAY_RATING: &str = "play_rating";
pub const VALUE_RATING: &str = "value_rating";
pub const OVERALL_RATING: &str = "overall_rating";

/// Leading identity column of the exported file.
pub const ROW_ID: &str = "row_id";

pub const RATING_COLUMNS: [&str; 3] = [PLAY_RATING, VALUE_RATING, OVERALL_RATING];

pub const DIFFICULTY_FEATURES: [&str; 3] = [AGE_MIN, PIECE_COUNT, LIST_PRICE];

/// Columns that must be free of nulls once imputation has run.
pub const IMPUTED_COLUMNS: [&str; 7] = [
    NUM_REVIEWS,
    REVIEW_DIFFICULTY,
    THEME_NAME,
    PROD_SHORT_DESC,
    PLAY_RATING,
    VALUE_RATING,
    OVERALL_RATING,
];
