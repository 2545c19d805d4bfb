//! Device-specific codecs built on the generic pipeline.
//!
//! Each device module declares its wire constants, its parameter schema,
//! and top-level `decode_sysex` / encode entry points that chain the
//! framer, transcoder, reassembler and schema mapper for that hardware.

pub mod jp8080;
pub mod ms2000;
