//! The execution engine: byte tape, instruction decoding and dispatch.

pub mod memory;
pub mod decode;
pub mod output;
pub mod execute;

pub use memory::{Memory, MemoryError, DEFAULT_MEMORY_SIZE};
pub use decode::{decode_line, decode_line_traced, DecodedLine, Opcode, TokenTrace};
pub use output::OutputHandler;
pub use execute::{Engine, EngineError, Snapshot};
