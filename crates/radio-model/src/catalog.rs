//! Fixed station catalog.  Built once on first use, never mutated.

use std::sync::OnceLock;

use crate::protocol::Station;

/// (name, stream url, artwork url)
const STATIONS: &[(&str, &str, &str)] = &[
    (
        "Radio Paradise",
        "https://stream.radioparadise.com/mp3-192",
        "https://placekitten.com/200/200",
    ),
    (
        "Jazz24",
        "https://live.wostreaming.net/direct/ppm-jazz24mp3-ibc1",
        "https://placekitten.com/201/200",
    ),
    (
        "BBC Radio 1",
        "http://stream.live.vc.bbcmedia.co.uk/bbc_radio_one",
        "https://placekitten.com/202/200",
    ),
    (
        "KEXP",
        "https://kexp-mp3-128.streamguys1.com/kexp128.mp3",
        "https://placekitten.com/203/200",
    ),
    (
        "NPR News",
        "https://npr-ice.streamguys1.com/live.mp3",
        "https://placekitten.com/204/200",
    ),
    (
        "Classical KUSC",
        "https://kusc.streamguys1.com/kusc128.mp3",
        "https://placekitten.com/205/200",
    ),
    (
        "Radio Swiss Pop",
        "http://stream.srg-ssr.ch/m/pop/mp3_128",
        "https://placekitten.com/206/200",
    ),
    (
        "Chilltrax",
        "https://ais-sa1.streamon.fm/7117_128k.aac",
        "https://placekitten.com/207/200",
    ),
    (
        "Deep House Lounge",
        "http://198.58.98.83:8356/stream",
        "https://placekitten.com/208/200",
    ),
    (
        "Dance Wave Retro",
        "https://stream.dancewave.online/retro",
        "https://placekitten.com/209/200",
    ),
];

static CATALOG: OnceLock<Vec<Station>> = OnceLock::new();

/// The station list, in display order.  Same slice on every call.
pub fn list_stations() -> &'static [Station] {
    CATALOG.get_or_init(|| {
        STATIONS
            .iter()
            .map(|(name, url, artwork_url)| Station {
                name: name.to_string(),
                url: url.to_string(),
                artwork_url: artwork_url.to_string(),
            })
            .collect()
    })
}

/// Owned copy of the catalog.
pub fn stations() -> Vec<Station> {
    list_stations().to_vec()
}

pub fn find_by_url(url: &str) -> Option<&'static Station> {
    list_stations().iter().find(|s| s.url == url)
}
