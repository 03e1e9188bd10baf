//! Output of the Chunk Processor's write pipeline, and the input to the
//! Writer's chunk-record emission step.

#[derive(Debug, Clone)]
pub struct ProcessedChunk {
    pub data: Vec<u8>,
    pub original_size: u32,
    pub stored_size: u32,
    pub compressed: bool,
    pub encrypted: bool,
}

impl ProcessedChunk {
    pub fn pass_through(plaintext: Vec<u8>) -> Self {
        let original_size = plaintext.len() as u32;
        ProcessedChunk {
            stored_size: original_size,
            data: plaintext,
            original_size,
            compressed: false,
            encrypted: false,
        }
    }
}
