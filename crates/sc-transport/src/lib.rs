pub mod assembly;
pub mod message;
pub mod receiver;
pub mod sender;

pub use assembly::ChunkAssembler;
pub use message::{
    CodeChunkHeader, ConversionData, ConversionMeta, GradientEntry, HtmlPreview, PreviewSize,
    SolidColorEntry, UiMessage,
};
pub use receiver::{ArtifactReceiver, ViewState};
pub use sender::{DEFAULT_CHUNK_LIMIT, MessageSender, split_chunks};
