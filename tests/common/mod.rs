use fundscope::{
    config::PipelineConfig,
    data::{observation::Observation, panel::Panel},
    pipeline::Pipeline,
    util::test_util::{setup_test_tracing, TracingGuards},
};
use chrono::NaiveDate;
use tracing::info;

pub const HEADER: &str = "Scheme Name,Date Valued,Nav Per Unit,Sale Price per Unit,Repurchase Price/Unit,\
                          Outstanding Number of Units,Net Asset Value,Remarks";

/// Two interleaved schemes with a spike, a duplicate, gaps, a bad date and a zero price.
pub const SCRAPED: &str = "Scheme Name,Date Valued,Nav Per Unit,Sale Price per Unit,Repurchase Price/Unit,\
Outstanding Number of Units,Net Asset Value,Remarks
Umoja Fund,01-12-2015,100.00,101.0,99.0,\"1,000\",100.0,
Wekeza Maisha,01-12-2015,10.0,10.5,10.0,\"2,000\",101.0,new
Umoja Fund,02-12-2015,101.00,102.0,100.0,\"1,000\",101.5,
Wekeza Maisha,03-12-2015,10.2,10.6,10.1,\"2,000\",102.0,
Umoja Fund,04-12-2015,102.0,103.0,101.0,\"1,000\",\"5,000.0\",spike
Wekeza Maisha,04-12-2015,10.1,10.6,10.1,\"2,000\",102.5,
Umoja Fund,05-12-2015,103.0,104.0,102.0,\"1,000\",103.0,
Umoja Fund,05-12-2015,103.5,104.0,102.0,\"1,000\",103.5,dup-last
Umoja Fund,08-12-2015,104.0,105.0,103.0,\"1,000\",104.0,
Umoja Fund,31-13-2015,1,1,1,1,1,bad date
Wekeza Maisha,05-01-2016,10.4,10.8,10.3,\"2,000\",9000.0,post cutoff
Umoja Fund,02-01-2016,105.0,0,0,\"1,000\",105.0,zero price
";

pub fn setup(test_name: &str) -> (Pipeline, TracingGuards) {
    let guards = setup_test_tracing(test_name);
    info!("-----------------");
    info!("Test: {}", test_name);
    info!("-----------------");
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    (pipeline, guards)
}

pub fn date(day: u32, month: u32, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn find<'a>(panel: &'a Panel, scheme: &str, day: NaiveDate) -> &'a Observation {
    panel
        .observations()
        .iter()
        .find(|o| o.scheme_name == scheme && o.date_valued == day)
        .unwrap_or_else(|| panic!("No row for {} on {}", scheme, day))
}

/// Builds CSV text for one scheme with consecutive days starting 1 Jan 2015.
pub fn single_scheme_csv(navs: &[f64]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    let start = date(1, 1, 2015);
    for (i, nav) in navs.iter().enumerate() {
        let day = start + chrono::Days::new(i as u64);
        text.push_str(&format!(
            "Umoja Fund,{},{},10,9,100,{},\n",
            day.format("%d-%m-%Y"),
            nav / 100.0,
            nav
        ));
    }
    text
}
