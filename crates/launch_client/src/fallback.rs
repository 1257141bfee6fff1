//! Static launches served when neither the API nor the cache can answer.

use chrono::{DateTime, Utc};
use common::{FlickrLinks, LaunchLinks, LaunchRecord, Launchpad, PatchLinks, Payload, Rocket};

struct Seed {
    id: &'static str,
    name: &'static str,
    date_utc: &'static str,
    pad: &'static str,
    lat: f64,
    lon: f64,
    region: &'static str,
    rocket: &'static str,
    payload_id: &'static str,
    payload: &'static str,
    payload_kind: &'static str,
    youtube_id: &'static str,
}

const SEEDS: [Seed; 5] = [
    Seed {
        id: "starlink-15-13",
        name: "Falcon 9 Block 5 | Starlink Group 15-13",
        date_utc: "2025-12-18T10:00:00Z",
        pad: "Space Launch Complex 40",
        lat: 28.561941,
        lon: -80.577357,
        region: "Cape Canaveral, FL, USA",
        rocket: "Falcon 9 Block 5",
        payload_id: "starlink-1",
        payload: "Starlink",
        payload_kind: "Communication",
        youtube_id: "hI9HQfCAw64",
    },
    Seed {
        id: "starlink-15-12",
        name: "Falcon 9 Block 5 | Starlink Group 15-12",
        date_utc: "2025-12-17T09:00:00Z",
        pad: "Space Launch Complex 4E",
        lat: 34.632,
        lon: -120.61,
        region: "Vandenberg SFB, CA, USA",
        rocket: "Falcon 9 Block 5",
        payload_id: "starlink-2",
        payload: "Starlink",
        payload_kind: "Communication",
        youtube_id: "j2BdNDTlWbo",
    },
    Seed {
        id: "starlink-15-11",
        name: "Falcon 9 Block 5 | Starlink Group 15-11",
        date_utc: "2025-12-15T15:00:00Z",
        pad: "LC-39A",
        lat: 28.608,
        lon: -80.604,
        region: "Kennedy Space Center, FL",
        rocket: "Falcon 9 Block 5",
        payload_id: "starlink-3",
        payload: "Starlink",
        payload_kind: "Communication",
        youtube_id: "rcd_SQZDlnk",
    },
    Seed {
        id: "crs-31",
        name: "Falcon 9 | CRS-31",
        date_utc: "2024-11-04T02:29:00Z",
        pad: "LC-39A",
        lat: 28.608,
        lon: -80.604,
        region: "Kennedy Space Center, FL",
        rocket: "Falcon 9",
        payload_id: "cargo",
        payload: "Cargo Dragon",
        payload_kind: "Resupply",
        youtube_id: "Pn6e1O5bEyA",
    },
    Seed {
        id: "starlink-6-85",
        name: "Falcon 9 | Starlink Group 6-85",
        date_utc: "2025-11-15T12:00:00Z",
        pad: "SLC-40",
        lat: 28.5619,
        lon: -80.5773,
        region: "Cape Canaveral, FL",
        rocket: "Falcon 9",
        payload_id: "starlink-4",
        payload: "Starlink",
        payload_kind: "Communication",
        youtube_id: "hI9HQfCAw64",
    },
];

/// The emergency launch list. Every record has valid coordinates.
pub fn fallback_launches() -> Vec<LaunchRecord> {
    SEEDS.iter().map(to_record).collect()
}

fn to_record(seed: &Seed) -> LaunchRecord {
    let date_utc = DateTime::parse_from_rfc3339(seed.date_utc)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    LaunchRecord {
        id: seed.id.into(),
        name: seed.name.into(),
        date_utc,
        date_unix: date_utc.timestamp(),
        success: true,
        launchpad: Launchpad {
            name: seed.pad.into(),
            latitude: seed.lat,
            longitude: seed.lon,
            region: seed.region.into(),
            full_name: seed.pad.into(),
        },
        rocket: Rocket {
            name: seed.rocket.into(),
            kind: "Falcon 9".into(),
        },
        payloads: vec![Payload {
            id: seed.payload_id.into(),
            name: seed.payload.into(),
            kind: seed.payload_kind.into(),
            orbit: "LEO".into(),
        }],
        links: LaunchLinks {
            patch: PatchLinks { small: None },
            flickr: FlickrLinks { original: vec![] },
            youtube_ids: vec![seed.youtube_id.into()],
            webcast: None,
        },
    }
}
