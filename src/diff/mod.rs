// Text instruction format.
//
// A diff is a concatenation of ADD and COPY instructions with no header,
// version tag or checksum.
//
// # Modules
//
// - `instruction`: Instruction type and its serialized form
// - `parser`     : Instruction stream parser
// - `encoder`    : Instruction writer and encode counters
// - `decoder`    : Instruction execution against the old buffer

pub mod decoder;
pub mod encoder;
pub mod instruction;
pub mod parser;

// Re-export key types for convenience.
pub use decoder::{DecodeError, DecodeOptions, DecodeStats, DiffDecoder, decode_memory};
pub use encoder::{DiffWriter, EncodeError, EncodeStats};
pub use instruction::Instruction;
pub use parser::InstructionIterator;
