//! Optional upload of delivered report artifacts to S3.

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const KEY_PREFIX: &str = "reports";

pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Object key for an artifact: `reports/<path relative to output_dir>`,
/// with `.gz` appended when compressed.
pub fn object_key(path: &Path, output_dir: &Path, gzip: bool) -> String {
    let relative = path.strip_prefix(output_dir).unwrap_or(path);
    let mut key = std::iter::once(KEY_PREFIX.to_string())
        .chain(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect::<Vec<_>>()
        .join("/");
    if gzip {
        key.push_str(".gz");
    }
    key
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Uploads each artifact file, optionally gzip-compressed. Returns the
/// number of objects written.
#[tracing::instrument(skip(client, paths), fields(artifacts = paths.len()))]
pub async fn upload_artifacts(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    output_dir: &Path,
    paths: &[PathBuf],
    gzip: bool,
) -> Result<usize> {
    let mut upload_count = 0;

    for path in paths {
        let contents =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let body = if gzip { gzip_bytes(&contents)? } else { contents };
        let key = object_key(path, output_dir, gzip);

        let mut request = client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_type(content_type(path))
            .body(ByteStream::from(body));
        if gzip {
            request = request.content_encoding("gzip");
        }

        request
            .send()
            .await
            .with_context(|| format!("S3 PutObject failed for '{key}'"))?;

        debug!(key = %key, "Artifact uploaded");
        upload_count += 1;
    }

    info!(upload_count, bucket, "S3 upload complete");
    Ok(upload_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_bytes_decompresses() {
        let compressed = gzip_bytes(b"key,label,count\n").unwrap();
        let mut decoded = String::new();
        GzDecoder::new(&compressed[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "key,label,count\n");
    }

    #[test]
    fn test_object_key_relative_to_output_dir() {
        let key = object_key(
            Path::new("out/daily_report/releases_per_day.json"),
            Path::new("out"),
            false,
        );
        assert_eq!(key, "reports/daily_report/releases_per_day.json");
    }

    #[test]
    fn test_object_key_gzip_suffix() {
        let key = object_key(
            Path::new("out/pie_chart/pie_chart_fast_slow.csv"),
            Path::new("out"),
            true,
        );
        assert_eq!(key, "reports/pie_chart/pie_chart_fast_slow.csv.gz");
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type(Path::new("a.json")), "application/json");
        assert_eq!(content_type(Path::new("a.csv")), "text/csv");
        assert_eq!(content_type(Path::new("a")), "application/octet-stream");
    }
}
