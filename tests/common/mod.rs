//! Fixture data for pipeline integration tests.
//!
//! Small CSV exports shaped like the real Seoul sources, written into a
//! temporary base directory.

#![allow(dead_code)]

use polars::prelude::DataFrame;
use seoul_daily::PipelineConfig;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ACCIDENT_CSV: &str = "\
,발생일,자치구명,사고건수,사망자수,중상자수,경상자수
0,2017-01-01,강남구,6,1,1,5
1,2017-01-01,종로구,4,0,1,3
2,2017-01-02,강남구,3,0,1,2
3,2019-12-31,마포구,0,0,0,0
";

pub const POLLUTION_CSV: &str = "\
dt,loc,so2,no2,co,o3,pm10,pm2.5
2016123123,101,0.004,0.021,0.5,0.010,41,12
2017010100,101,0.010,0.020,0.4,0.020,20,10
2017010101,102,,0.040,0.6,0.020,30,21
2017010200,101,0.030,0.050,3.0,0.100,,
2019123123,101,0.200,0.250,16,0.200,200,100
2020010100,101,0.003,0.010,0.3,0.010,10,5
";

pub const WEATHER_HEADER: &str = "name,datetime,temp,humidity,precip,snow,windspeed,winddir,sealevelpressure,visibility,solarradiation,conditions";

pub const WEATHER_FIRST_ROWS: &str = "\
seoul,2016-12-31,-2.0,50.0,0,,10.0,280,1025.0,10.0,100.0,Clear
seoul,2017-06-01,22.5,60.0,0.5,,8.0,200,1010.0,9.5,250.0,\"Rain, Partially cloudy\"
seoul,2018-01-01,-7.5,40.0,0,,12.0,300,1030.0,10.0,90.0,Overcast
";

pub const WEATHER_SECOND_ROWS: &str = "\
seoul,2018-01-01T00:00:00,-6.0,45.0,0,0.5,11.0,310,1029.0,8.0,80.0,Clear
seoul,2019-12-31T00:00:00,1.0,70.0,0,,5.0,90,1020.0,7.0,60.0,\"Snow, Mostly cloudy\"
seoul,2020-01-01T00:00:00,0.5,,,,4.0,100,1018.0,6.0,,Clear
";

pub const WEATHER_FIRST_FILE: &str = "seoul 2016-01-01 to 2018-01-01.csv";
pub const WEATHER_SECOND_FILE: &str = "seoul 2018-01-01 to 2020-01-01.csv";

/// Temporary base directory with an empty `data/` folder
pub struct Fixture {
    pub temp_dir: TempDir,
    pub config: PipelineConfig,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(temp_dir.path());
        fs::create_dir_all(config.data_path()).unwrap();
        Self { temp_dir, config }
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.config.data_file(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.data_file(name), content).unwrap();
    }

    pub fn with_accident_source(self) -> Self {
        self.write("Seoul_Traffic_Accident_20172019.csv", ACCIDENT_CSV);
        self
    }

    pub fn with_pollution_source(self) -> Self {
        self.write("seoul_air_1988_2021.csv", POLLUTION_CSV);
        self
    }

    pub fn with_weather_sources(self) -> Self {
        self.write(
            WEATHER_FIRST_FILE,
            &format!("{WEATHER_HEADER}\n{WEATHER_FIRST_ROWS}"),
        );
        self.write(
            WEATHER_SECOND_FILE,
            &format!("{WEATHER_HEADER}\n{WEATHER_SECOND_ROWS}"),
        );
        self
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn column_i64(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn column_f64(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Whether every `(year, month, day)` key occurs once
pub fn date_keys_unique(df: &DataFrame) -> bool {
    let years = column_i64(df, "year");
    let months = column_i64(df, "month");
    let days = column_i64(df, "day");

    let mut seen = HashSet::new();
    years
        .into_iter()
        .zip(months)
        .zip(days)
        .all(|key| seen.insert(key))
}

/// Same columns, types and values, nulls compared equal
pub fn assert_same_frame(left: &DataFrame, right: &DataFrame) {
    assert_eq!(left.schema(), right.schema());
    assert!(left.equals_missing(right), "{left}\n!=\n{right}");
}
