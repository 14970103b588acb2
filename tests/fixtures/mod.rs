#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tunesync::{paths, Library};

pub const ITUNES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>Major Version</key><integer>1</integer>
	<key>Minor Version</key><integer>1</integer>
	<key>Music Folder</key><string>file://localhost/Users/me/Music/iTunes/iTunes%20Media/</string>
	<key>Tracks</key>
	<dict>
		<key>2187</key>
		<dict>
			<key>Track ID</key><integer>2187</integer>
			<key>Name</key><string>Scumbag</string>
			<key>Artist</key><string>Green Day</string>
			<key>Album Artist</key><string>Green Day</string>
			<key>Album</key><string>Shenanigans</string>
			<key>Genre</key><string>Garage rock</string>
			<key>Track Number</key><integer>8</integer>
			<key>Year</key><integer>2002</integer>
			<key>Play Count</key><integer>12</integer>
			<key>Rating</key><integer>60</integer>
			<key>Track Type</key><string>File</string>
			<key>Location</key><string>file://localhost/Users/me/Music/iTunes/iTunes%20Media/Music/Green%20Day/Shenanigans/08%20Scumbag.mp3</string>
		</dict>
		<key>2183</key>
		<dict>
			<key>Track ID</key><integer>2183</integer>
			<key>Name</key><string>All the Time</string>
			<key>Artist</key><string>Green Day</string>
			<key>Album</key><string>Shenanigans</string>
			<key>Track Number</key><integer>9</integer>
			<key>Rating</key><integer>100</integer>
			<key>Location</key><string>file://localhost/Users/me/Music/iTunes/iTunes%20Media/Music/Green%20Day/Shenanigans/09%20All%20the%20Time.mp3</string>
		</dict>
		<key>4801</key>
		<dict>
			<key>Track ID</key><integer>4801</integer>
			<key>Name</key><string>Ständchen</string>
			<key>Artist</key><string>Schubert</string>
			<key>Album</key><string>Schwanengesang</string>
			<key>Genre</key><string>Classical</string>
			<key>Disc Number</key><integer>1</integer>
			<key>Track Number</key><integer>4</integer>
			<key>Year</key><integer>1829</integer>
			<key>Rating</key><integer>100</integer>
			<key>Location</key><string>file://localhost/Users/me/Music/iTunes/iTunes%20Media/Music/Schubert/Schwanengesang/1-04%20St%C3%A4ndchen.m4a</string>
		</dict>
		<key>1</key>
		<dict>
			<key>Track ID</key><integer>1</integer>
			<key>Name</key><string>Sink the Pink</string>
			<key>Artist</key><string>AC/DC</string>
			<key>Album</key><string>Who Made Who</string>
			<key>Track Number</key><integer>3</integer>
		</dict>
		<key>77</key>
		<dict>
			<key>Track ID</key><integer>77</integer>
			<key>Name</key><string>Internet Radio</string>
			<key>Track Type</key><string>Remote</string>
		</dict>
	</dict>
	<key>Playlists</key>
	<array>
		<dict>
			<key>Name</key><string>Library</string>
			<key>Master</key><true/>
			<key>Playlist ID</key><integer>100</integer>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>2187</integer></dict>
				<dict><key>Track ID</key><integer>2183</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Lista Green Day</string>
			<key>Playlist ID</key><integer>13635</integer>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>2187</integer></dict>
				<dict><key>Track ID</key><integer>2183</integer></dict>
				<dict><key>Track ID</key><integer>9999</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Empty</string>
			<key>Playlist ID</key><integer>150</integer>
		</dict>
		<dict>
			<key>Name</key><string>Mix</string>
			<key>Playlist ID</key><integer>200</integer>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>4801</integer></dict>
				<dict><key>Track ID</key><integer>1</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Mix</string>
			<key>Playlist ID</key><integer>201</integer>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>2187</integer></dict>
			</array>
		</dict>
		<dict>
			<key>Name</key><string>Rock &amp; Roll</string>
			<key>Playlist ID</key><integer>300</integer>
			<key>Playlist Items</key>
			<array>
				<dict><key>Track ID</key><integer>2183</integer></dict>
			</array>
		</dict>
	</array>
</dict>
</plist>
"#;

pub const RHYTHMDB_XML: &str = r#"<?xml version="1.0" standalone="yes"?>
<rhythmdb version="2.0">
  <entry type="song">
    <title>Scumbag</title>
    <genre>Garage rock</genre>
    <artist>Green Day</artist>
    <album>Shenanigans</album>
    <track-number>8</track-number>
    <date>730851</date>
    <location>file:///home/me/Music/Green%20Day/Shenanigans/08%20Scumbag.mp3</location>
    <play-count>12</play-count>
    <rating>1</rating>
  </entry>
  <entry type="iradio">
    <title>Some Radio</title>
    <location>http://radio.example.com/stream</location>
  </entry>
  <entry type="song">
    <title>Ständchen</title>
    <artist>Schubert</artist>
    <album>Schwanengesang</album>
    <track-number>4</track-number>
    <disc-number>1</disc-number>
    <location>file:///home/me/Music/Schubert/Schwanengesang/1-04%20St%C3%A4ndchen.ogg</location>
  </entry>
</rhythmdb>
"#;

pub const RHYTHMBOX_PLAYLISTS_XML: &str = r#"<?xml version="1.0"?>
<rhythmdb-playlists>
  <playlist name="Rock &amp; Roll" show-browser="true" browser-position="180" search-type="search-match" type="static">
    <location>file:///home/me/Music/Green%20Day/Shenanigans/08%20Scumbag.mp3</location>
    <location>file:///home/me/Music/Schubert/Schwanengesang/1-04%20St%C3%A4ndchen.ogg</location>
  </playlist>
  <playlist name="My Top Rated" show-browser="false" browser-position="180" search-type="search-match" type="automatic" sort-key="Rating" sort-direction="1">
    <conjunction>
      <equals prop="type">song</equals>
    </conjunction>
  </playlist>
  <playlist name="Play Queue" show-browser="false" browser-position="180" search-type="search-match" type="queue"/>
</rhythmdb-playlists>
"#;

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn itunes_library(dir: &Path) -> PathBuf {
    write_file(dir, "iTunes Music Library.xml", ITUNES_XML)
}

pub fn rhythmbox_files(dir: &Path) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "rhythmdb.xml", RHYTHMDB_XML),
        write_file(dir, "playlists.xml", RHYTHMBOX_PLAYLISTS_XML),
    )
}

/// Lays out a source music folder for every song except `skip`. Each file
/// holds its own relative path so copies can be checked.
pub fn music_folder(root: &Path, library: &Library, skip: &[u64]) {
    for song in library.songs().iter().filter(|s| !skip.contains(&s.id)) {
        let relative = paths::file_path(song);
        let path = root.join(&relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, &relative).unwrap();
    }
}

/// Every file under `root`, as sorted `/`-separated relative paths.
pub fn tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }

    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}
