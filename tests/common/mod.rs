#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use gdp_dashboard::loader::{normalize, read_csv, NormalizeOptions};
use gdp_dashboard::types::Dataset;
use tempfile::{tempdir, TempDir};

/// Seven countries in three regions, shaped like the countries-of-the-world
/// export: padded labels, a comma-formatted column and scattered gaps.
///
/// Gaps: Beta literacy and climate, Gamma GDP, Zeta literacy and agriculture.
pub const COUNTRIES_CSV: &str = "\
Country,Region,Population,Area (sq. mi.),Pop. Density (per sq. mi.),Coastline (coast/area ratio),Net migration,Infant mortality (per 1000 births),GDP ($ per capita),Literacy (%),Phones (per 1000),Arable (%),Crops (%),Other (%),Climate,Birthrate,Deathrate,Agriculture,Industry,Service
Alpha ,ASIA ,1000,500,\"1,200.5\",0.1,1.0,50,700,36.0,3.2,12,0.2,87,1,46.6,20.3,0.38,0.24,0.38
Beta,ASIA,2000,600,80.0,0.2,-1.0,30,2000,,5.0,10,0.3,80,,30.0,10.0,0.2,0.3,0.5
Gamma,  ASIA,3000,700,90.0,0.3,0.0,20,,90.0,6.0,11,0.4,85,2,20.0,8.0,0.1,0.4,0.5
Delta,EUROPE,4000,800,100.0,0.4,2.0,5,30000,99.0,500,20,1,79,3,10,9,0.02,0.3,0.68
Epsilon,EUROPE,5000,900,110.0,0.5,1.0,4,25000,98.0,450,25,2,73,3,11,10,0.03,0.25,0.72
Zeta,EUROPE,6000,1000,120.0,0.6,0.5,6,25000,,400,30,3,67,4,12,11,,0.2,0.78
Eta,AFRICA,7000,1100,20.0,0.0,-2.0,100,500,40.0,10,5,1,94,2,45,15,0.5,0.2,0.3
";

pub fn raw_countries() -> Dataset {
    read_csv(COUNTRIES_CSV.as_bytes()).expect("parse fixture").0
}

pub fn normalized_countries() -> Dataset {
    normalize(raw_countries(), &NormalizeOptions::default())
        .expect("normalize fixture")
        .0
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
