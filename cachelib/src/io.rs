use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use crate::error::ResourceError;

/// Opens a trace file for line by line reading
pub fn open_trace(path: &Path) -> Result<impl BufRead, ResourceError> {
    let file = File::open(path).map_err(|source| ResourceError::Open { path: path.to_path_buf(), source })?;
    get_reader(file)
}

pub fn get_reader(file: File) -> Result<impl BufRead, ResourceError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // Trace lines are short, read a few pages at a time
        const BUFFER_SIZE: usize = 40 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // The trace is only read front to back, and nothing else writes to it while simulating
        unsafe {
            let m = Mmap::map(&file).map_err(ResourceError::Map)?;
            m.advise(Advice::Sequential).map_err(ResourceError::Map)?;
            Ok(Cursor::new(m))
        }
    }
}
