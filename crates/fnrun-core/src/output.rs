use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// How a container's stdout reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTransform {
    /// Bytes are copied as they arrive.
    Passthrough,
    /// One response record per line; each record is written and flushed
    /// whole, so responses to multiplexed calls never interleave.
    JsonLines,
}

/// Relay `source` into `sink` according to `transform`.
///
/// Returns the number of records relayed for [`OutputTransform::JsonLines`]
/// (a trailing unterminated fragment counts as one) and `None` for
/// passthrough. Bytes are never altered.
pub async fn relay<R, W>(
    transform: OutputTransform,
    source: R,
    sink: &mut W,
) -> std::io::Result<Option<usize>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    match transform {
        OutputTransform::Passthrough => {
            let mut source = source;
            tokio::io::copy(&mut source, sink).await?;
            sink.flush().await?;
            Ok(None)
        }
        OutputTransform::JsonLines => relay_lines(source, sink).await.map(Some),
    }
}

async fn relay_lines<R, W>(source: R, sink: &mut W) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut reader = BufReader::new(source);
    let mut record = Vec::new();
    let mut records = 0;

    loop {
        record.clear();
        if reader.read_until(b'\n', &mut record).await? == 0 {
            break;
        }
        sink.write_all(&record).await?;
        sink.flush().await?;
        records += 1;
        tracing::trace!(records, bytes = record.len(), "Relayed output record");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_lines_preserves_bytes_and_counts_records() {
        let output = b"{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n".to_vec();
        let mut sink = Vec::new();

        let records = relay(OutputTransform::JsonLines, &output[..], &mut sink)
            .await
            .unwrap();

        assert_eq!(records, Some(3));
        assert_eq!(sink, output);
    }

    #[tokio::test]
    async fn json_lines_flushes_trailing_fragment() {
        let output = b"{\"a\":1}\n{\"partial\":".to_vec();
        let mut sink = Vec::new();

        let records = relay(OutputTransform::JsonLines, &output[..], &mut sink)
            .await
            .unwrap();

        assert_eq!(records, Some(2));
        assert_eq!(sink, output);
    }

    #[tokio::test]
    async fn passthrough_copies_everything() {
        let output = b"Hello World\nno newline at end".to_vec();
        let mut sink = Vec::new();

        let records = relay(OutputTransform::Passthrough, &output[..], &mut sink)
            .await
            .unwrap();

        assert_eq!(records, None);
        assert_eq!(sink, output);
    }

    #[tokio::test]
    async fn empty_output_has_no_records() {
        let mut sink = Vec::new();
        let records = relay(OutputTransform::JsonLines, &b""[..], &mut sink)
            .await
            .unwrap();
        assert_eq!(records, Some(0));
        assert!(sink.is_empty());
    }
}
