//! Application constants for the Seoul daily pipelines
//!
//! File names, raw column names, output schemas and the fixed pollutant
//! level thresholds shared by the three domains.

// =============================================================================
// Shared
// =============================================================================

/// Default data directory name under the configured base directory
pub const DATA_DIR_NAME: &str = "data";

/// Grouping key present in every output
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const DATE_KEY: [&str; 3] = [YEAR, MONTH, DAY];

/// Years covered by the fixed `import_csv` wrappers
pub const DEFAULT_START_YEAR: i64 = 2017;
pub const DEFAULT_END_YEAR: i64 = 2019;

/// Sentinel meaning "use the data's own bound"
pub const YEAR_SENTINEL: i64 = -1;

/// Decimal places kept for means and rates
pub const ROUND_DECIMALS: i32 = 2;

// =============================================================================
// Accident
// =============================================================================

pub mod accident {
    pub const RAW_FILE: &str = "Seoul_Traffic_Accident_20172019.csv";
    pub const PREPROCESSED_FILE: &str = "accident_preprocessed.csv";

    /// Occurrence date, `YYYY-MM-DD`
    pub const RAW_DATE: &str = "발생일";
    pub const RAW_ACCIDENTS: &str = "사고건수";
    pub const RAW_DEATHS: &str = "사망자수";
    pub const RAW_SEVERE: &str = "중상자수";
    pub const RAW_MINOR: &str = "경상자수";

    pub const ACCIDENT_CNT: &str = "accident_cnt";
    pub const DEATH: &str = "death";
    pub const FATAL: &str = "fatal";
    pub const INJURED: &str = "injured";
    pub const DEATH_RATE: &str = "death_rate(%)";
    pub const FATAL_RATE: &str = "fatal_rate(%)";

    /// Summed count columns, raw name paired with output name
    pub const COUNT_COLUMNS: [(&str, &str); 4] = [
        (RAW_ACCIDENTS, ACCIDENT_CNT),
        (RAW_DEATHS, DEATH),
        (RAW_SEVERE, FATAL),
        (RAW_MINOR, INJURED),
    ];
}

// =============================================================================
// Pollution
// =============================================================================

pub mod pollution {
    pub const RAW_FILE: &str = "seoul_air_1988_2021.csv";
    pub const RAW_RANGE_FILE: &str = "pollution_raw.csv";
    pub const PREPROCESSED_FILE: &str = "pollution_preprocessed.csv";

    /// Packed hourly timestamp, `YYYYMMDDHH`
    pub const RAW_DATE: &str = "dt";

    pub const LEVEL_SUFFIX: &str = "_level";

    /// Pollutants in output order with their level boundaries.
    ///
    /// A value maps to level 0 when `<= b1`, 1 when `<= b2`, 2 when `<= b3`
    /// and 3 otherwise.
    pub const POLLUTANTS: [(&str, [f64; 3]); 6] = [
        ("so2", [0.02, 0.05, 0.15]),
        ("no2", [0.03, 0.06, 0.20]),
        ("co", [2.0, 9.0, 15.0]),
        ("o3", [0.03, 0.09, 0.15]),
        ("pm10", [30.0, 80.0, 150.0]),
        ("pm2.5", [15.0, 35.0, 75.0]),
    ];
}

// =============================================================================
// Weather
// =============================================================================

pub mod weather {
    pub const RAW_CACHE_FILE: &str = "weather_raw.csv";
    pub const PREPROCESSED_FILE: &str = "weather_preprocessed.csv";

    /// Default raw exports, overlapping on 2018-01-01
    pub const DEFAULT_FILES: [&str; 2] = [
        "seoul 2016-01-01 to 2018-01-01.csv",
        "seoul 2018-01-01 to 2020-01-01.csv",
    ];

    pub const CSV_SUFFIX: &str = ".csv";

    pub const RAW_DATE: &str = "datetime";
    pub const RAW_CONDITIONS: &str = "conditions";
    pub const CLOUDY: &str = "cloudy";

    /// Measurements zero-filled and coerced to floating point
    pub const MEASUREMENTS: [&str; 9] = [
        "temp",
        "humidity",
        "precip",
        "snow",
        "windspeed",
        "winddir",
        "sealevelpressure",
        "visibility",
        "solarradiation",
    ];

    /// Output column order
    pub const OUTPUT_COLUMNS: [&str; 13] = [
        "year",
        "month",
        "day",
        "temp",
        "humidity",
        "cloudy",
        "precip",
        "snow",
        "windspeed",
        "winddir",
        "sealevelpressure",
        "visibility",
        "solarradiation",
    ];
}
