//! Table of NSRDB download endpoints: base URLs, server allow-lists, and the
//! extra temporal parameters each dataset takes.

/// NSRDB dataset families served by the v2 download endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Physical Solar Model v3, yearly files at 30/60 minute resolution.
    Psm3,
    /// PSM v3 typical meteorological year (tmy/tdy/tgy) files.
    Psm3Tmy,
    /// PSM v3 five-minute temporal resolution files.
    Psm3FiveMinute,
}

#[derive(Debug)]
pub(crate) struct DatasetProfile {
    pub(crate) base_url: &'static str,
    pub(crate) allowed_attributes: &'static [&'static str],
    pub(crate) allowed_names: &'static [&'static str],
    pub(crate) default_name: &'static str,
    /// Endpoints documented to accept a single dataset name.
    pub(crate) single_name: bool,
    /// Whether the endpoint takes `leap_day` and `interval`.
    pub(crate) temporal_params: bool,
    pub(crate) default_interval: Option<u32>,
}

static PSM3: DatasetProfile = DatasetProfile {
    base_url: "https://developer.nrel.gov/api/nsrdb/v2/solar/psm3-download",
    allowed_attributes: &[
        "air_temperature",
        "clearsky_dhi",
        "clearsky_dni",
        "clearsky_ghi",
        "cloud_type",
        "dew_point",
        "dhi",
        "dni",
        "fill_flag",
        "ghi",
        "ghuv-280-400",
        "ghuv-285-385",
        "relative_humidity",
        "solar_zenith_angle",
        "surface_albedo",
        "surface_pressure",
        "total_precipitable_water",
        "wind_direction",
        "wind_speed",
    ],
    allowed_names: &[
        "1998", "1999", "2000", "2001", "2002", "2003", "2004", "2005", "2006", "2007", "2008",
        "2009", "2010", "2011", "2012", "2013", "2014", "2015", "2016", "2017", "2018", "2019",
    ],
    default_name: "2019",
    single_name: false,
    temporal_params: true,
    default_interval: Some(60),
};

static PSM3_TMY: DatasetProfile = DatasetProfile {
    base_url: "https://developer.nrel.gov/api/nsrdb/v2/solar/psm3-tmy-download",
    allowed_attributes: &[
        "dhi",
        "dni",
        "ghi",
        "dew_point",
        "air_temperature",
        "surface_pressure",
        "wind_direction",
        "wind_speed",
        "surface_albedo",
    ],
    allowed_names: &[
        "tmy-2017", "tdy-2017", "tgy-2017", "tmy-2018", "tdy-2018", "tgy-2018", "tmy-2019",
        "tdy-2019", "tgy-2019", "tmy-2020", "tdy-2020", "tgy-2020",
    ],
    default_name: "tmy-2020",
    single_name: true,
    temporal_params: false,
    default_interval: None,
};

static PSM3_FIVE_MINUTE: DatasetProfile = DatasetProfile {
    base_url: "https://developer.nrel.gov/api/nsrdb/v2/solar/psm3-5min-download",
    allowed_attributes: &[
        "air_temperature",
        "clearsky_dhi",
        "clearsky_dni",
        "clearsky_ghi",
        "cloud_type",
        "dew_point",
        "dhi",
        "dni",
        "fill_flag",
        "ghi",
        "relative_humidity",
        "solar_zenith_angle",
        "surface_albedo",
        "surface_pressure",
        "total_precipitable_water",
        "wind_direction",
        "wind_speed",
    ],
    allowed_names: &["2018", "2019", "2020"],
    default_name: "2020",
    single_name: false,
    temporal_params: true,
    default_interval: Some(5),
};

impl Dataset {
    pub(crate) fn profile(self) -> &'static DatasetProfile {
        match self {
            Self::Psm3 => &PSM3,
            Self::Psm3Tmy => &PSM3_TMY,
            Self::Psm3FiveMinute => &PSM3_FIVE_MINUTE,
        }
    }
}

/// Dataset availability listing endpoint (always synchronous JSON).
pub(crate) const DATA_QUERY_URL: &str =
    "https://developer.nrel.gov/api/solar/nsrdb_data_query.json";

pub(crate) const DATA_QUERY_TYPES: &[&str] = &["station", "satellite"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseFormat {
    Csv,
    Json,
}

/// Picks the download URL and expected response format.
///
/// A single point with a single dataset name may download CSV directly;
/// every other shape or cardinality goes through server-side file generation
/// and answers with a JSON submission receipt. The server documents the rule
/// in exactly these terms, so the check is plain string inspection of the
/// WKT prefix and the comma count, with no geometry involved.
pub(crate) fn select_endpoint(base_url: &str, wkt: &str, names: &str) -> (String, ResponseFormat) {
    let single_name = names
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .count()
        == 1;
    if wkt.starts_with("POINT") && single_name {
        (format!("{base_url}.csv"), ResponseFormat::Csv)
    } else {
        (format!("{base_url}.json"), ResponseFormat::Json)
    }
}
