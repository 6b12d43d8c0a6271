use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn create_file(path: &Path) -> io::Result<File> {
    File::create(path).map_err(|e| {
        log::error!("could not create {}: {}", path.display(), e);
        e
    })
}

fn open_file(path: &Path) -> io::Result<File> {
    File::open(path)
}

pub fn load_reader(path: impl AsRef<Path>) -> io::Result<BufReader<File>> {
    let file = open_file(path.as_ref())?;
    Ok(BufReader::new(file))
}

/// Reads a whole text file
pub fn load_string(path: impl AsRef<Path>) -> io::Result<String> {
    let path = path.as_ref();
    let mut s = String::new();
    load_reader(path)?.read_to_string(&mut s)?;
    log::info!("successfully loaded {}", path.display());
    Ok(s)
}

pub fn save_string(path: impl AsRef<Path>, contents: &str) -> io::Result<()> {
    save_string_silent(path.as_ref(), contents)?;
    log::info!("successfully saved {}", path.as_ref().display());
    Ok(())
}

pub fn save_string_silent(path: impl AsRef<Path>, contents: &str) -> io::Result<()> {
    let file = create_file(path.as_ref())?;

    let mut w = BufWriter::new(file);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

pub fn save_json<T: Serialize>(x: &T, path: impl AsRef<Path>) -> Option<()> {
    let path = path.as_ref();
    let file = create_file(path).ok()?;

    let w = BufWriter::new(file);

    serde_json::to_writer_pretty(w, x)
        .map_err(|e| log::error!("failed serializing: {}", e))
        .ok()?;
    log::info!("successfully saved {}", path.display());
    Some(())
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Option<T> {
    let path = path.as_ref();
    serde_json::from_reader(load_reader(path).ok()?)
        .map_err(|err| log::error!("failed deserializing {}: {}", path.display(), err))
        .map(|x| {
            log::info!("successfully loaded {}", path.display());
            x
        })
        .ok()
}

pub fn load_json_or_default<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> T {
    load_json(path).unwrap_or_default()
}
