use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use log::{debug, info};

use super::codec;
use crate::{neural_net::Network, NetErr, Result};

const EXTENSION: &str = "csv";

/// A directory of network checkpoints, one `<name>.csv` record per network.
///
/// Writes are not transactional, a crash halfway through a save can leave a corrupt record.
#[derive(Clone, Debug)]
pub struct NetworkStore {
    dir: PathBuf,
}

impl NetworkStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The checkpoint path of the network called `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Writes `net` to its checkpoint, creating the directory if needed.
    pub fn save(&self, net: &Network) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(net.name());
        let file = File::create(&path)?;
        codec::encode(net, BufWriter::new(file))?;

        debug!("saved network '{}' to {}", net.name(), path.display());
        Ok(())
    }

    /// Loads the network called `name`.
    ///
    /// # Returns
    /// The network, `NetworkNotFound` if there's no checkpoint for it, or the reason the
    /// checkpoint couldn't be read.
    pub fn load(&self, name: &str) -> Result<Network> {
        let path = self.path(name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(NetErr::NetworkNotFound { name: name.into() });
            }
            Err(e) => return Err(e.into()),
        };

        let net = codec::decode(name, BufReader::new(file))?;
        info!(
            "loaded network '{name}': {}x{} inputs, {} hidden layers, {} outputs, trained {}",
            net.input_width(),
            net.input_height(),
            net.hidden_layers().len(),
            net.outputs().len(),
            net.trained_time()
        );

        Ok(net)
    }

    /// The names of every stored network, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
