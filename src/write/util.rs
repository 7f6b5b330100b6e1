use std::io;

/// A writer that tracks how many bytes have been written through it.
///
/// The encoder uses the count to report the size of each part of the file.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    len: u64,
}

impl<W: io::Write> CountingWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        CountingWriter { inner, len: 0 }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> io::Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write `values` separated by single spaces, followed by a newline.
pub(crate) fn write_row<W, T>(w: &mut W, values: &[T]) -> io::Result<()>
where
    W: io::Write,
    T: std::fmt::Display,
{
    let mut first = true;
    for value in values {
        if !first {
            w.write_all(b" ")?;
        }
        first = false;
        write!(w, "{}", value)?;
    }
    w.write_all(b"\n")
}
