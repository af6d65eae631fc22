use anyhow::{Context, Result};
use clustering_common::{MetricSample, SimulationConfig, WorldSnapshot};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column names of the metrics CSV.
pub const CSV_HEADER: [&str; 6] = ["Cooldown", "Threshold", "Run", "Iteration", "ClusterSize", "InteractionCount"];

/// Appends metric rows to a CSV sink. The header is written once, on creation.
pub struct MetricsWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl MetricsWriter<File> {
    /// Truncates (or creates) `path` and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Could not open the output file '{}' for writing", path.display()))?;
        Self::new(file)
    }
}

impl<W: Write> MetricsWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Writes `samples` in order and flushes.
    pub fn append(&mut self, samples: &[MetricSample]) -> Result<()> {
        for sample in samples {
            self.writer.serialize(sample)?;
        }
        self.writer.flush()?;
        self.rows += samples.len();
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> usize { self.rows }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush metrics writer: {}", e))
    }
}

/// `<dir>/<stem><suffix>` next to `csv_path`, e.g. `runs/data.csv` + `_metadata.json`.
pub fn sibling_path(csv_path: &Path, suffix: &str) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ground_data".to_string());
    csv_path.with_file_name(format!("{}{}", stem, suffix))
}

/// Writes the resolved configuration as pretty JSON.
pub fn write_metadata(path: &Path, config: &SimulationConfig) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Error creating metadata file '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), config)
        .with_context(|| format!("Error serializing metadata to '{}'", path.display()))?;
    info!("Run metadata saved to {}", path.display());
    Ok(())
}

/// Saves final snapshots in `format` ("json", "bincode" or "messagepack") next to `csv_path`.
/// Unknown formats fall back to JSON. Returns the file written.
pub fn save_snapshots(csv_path: &Path, format: &str, snapshots: &[WorldSnapshot]) -> Result<PathBuf> {
    let format = match format {
        "json" | "bincode" | "messagepack" => format,
        other => {
            error!("Unknown output format: {}. Using JSON instead.", other);
            "json"
        }
    };

    match format {
        "bincode" => {
            // Binary format (much more compact)
            let filename = sibling_path(csv_path, "_snapshots.bin");
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
            bincode::serialize_into(BufWriter::new(file), snapshots)
                .context("Error serializing snapshots to bincode")?;
            info!("All snapshots saved to {} (binary format)", filename.display());
            Ok(filename)
        }
        "messagepack" => {
            let filename = sibling_path(csv_path, "_snapshots.msgpack");
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
            let mut writer = BufWriter::new(file);
            rmp_serde::encode::write(&mut writer, snapshots)
                .context("Error serializing snapshots to MessagePack")?;
            writer.flush()?;
            info!("All snapshots saved to {} (MessagePack format)", filename.display());
            Ok(filename)
        }
        _ => {
            let filename = sibling_path(csv_path, "_snapshots.json");
            let file = File::create(&filename)
                .with_context(|| format!("Error creating snapshot file '{}'", filename.display()))?;
            serde_json::to_writer(BufWriter::new(file), snapshots)
                .context("Error serializing snapshots to JSON")?;
            info!("All snapshots saved to {}", filename.display());
            Ok(filename)
        }
    }
}
