use std::fs::File;
use std::ops::Deref;

/// The contents of a trace file
pub enum TraceBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            #[cfg(unix)]
            TraceBytes::Mapped(m) => &m[..],
            TraceBytes::Buffered(b) => &b[..],
        }
    }
}

/// Makes a trace file available as one byte slice
///
/// Memory mapped on unix systems, since traces can run to hundreds of megabytes and are read
/// front to back exactly once. Read into memory elsewhere
pub fn read_trace(file: File) -> Result<TraceBytes, String> {
    #[cfg(not(unix))]
    {
        use std::io::Read;
        let mut buf = Vec::new();
        let mut file = file;
        file.read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace file: {e}"))?;
        Ok(TraceBytes::Buffered(buf))
    }
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        let len = file
            .metadata()
            .map_err(|e| format!("Couldn't read the trace file's metadata: {e}"))?
            .len();
        // Mapping an empty file fails on some platforms
        if len == 0 {
            return Ok(TraceBytes::Buffered(Vec::new()));
        }
        // The mapping is only read, and the file isn't expected to change while we run
        let m = unsafe { Mmap::map(&file) }
            .map_err(|e| format!("Couldn't memory map the file: {e}"))?;
        m.advise(Advice::Sequential)
            .map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
        Ok(TraceBytes::Mapped(m))
    }
}
