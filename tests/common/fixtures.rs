use serde_json::{json, Value};

pub const KENYA_SONG_ID: &str = "SOSVHAP12AB017D5FD";
pub const KENYA_ARTIST_ID: &str = "AR1AWYK1187FB5E30F";
pub const KENYA_TS: i64 = 1541990258796;
pub const KENYA_START_TIME: &str = "2018-11-12 02:37:38.796";

/// Song file content in the Million Song Dataset layout.
pub fn song_json(
    song_id: &str,
    artist_id: &str,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> String {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 2000
    })
    .to_string()
}

pub fn kenya_song_json() -> String {
    song_json(KENYA_SONG_ID, KENYA_ARTIST_ID, "Kenya", "Kadja Nin", 145.8)
}

/// A `NextSong` event with every field populated.
pub fn play_event(
    ts: i64,
    user_id: &str,
    level: &str,
    song: &str,
    artist: &str,
    length: f64,
) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Ryan",
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Smith",
        "length": length,
        "level": level,
        "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1541016707796.0,
        "sessionId": 583,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

pub fn kenya_play_event() -> Value {
    play_event(KENYA_TS, "26", "free", "Kenya", "Kadja Nin", 145.8)
}

/// A non-play page view; carries no song fields.
pub fn page_event(page: &str, ts: i64, user_id: &str) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Ryan",
        "gender": "M",
        "lastName": "Smith",
        "length": null,
        "level": "free",
        "page": page,
        "sessionId": 583,
        "song": null,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}
