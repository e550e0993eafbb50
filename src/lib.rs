/*!
# jpegcore

`jpegcore` is the front-end of a JPEG (ITU-T T.81 / JFIF / EXIF) decoder: the
marker-stream lexer, the segment parser suite, the two-level Huffman table
builder, the quantization table store, the scan composer, and the driver
state machine that sequences them from `SOI` through to scans ready for
entropy decoding.

Inverse DCT, color conversion, pixel packing, encoding, and terminal/CLI
tooling are deliberately not part of this crate; they are downstream
consumers of [`driver::Decoder`]'s event stream.

## Usage

```
use jpegcore::byte_source::SliceSource;
use jpegcore::driver::{Decoder, DecoderEvent};

fn walk(data: &[u8]) {
    let mut decoder = Decoder::new(SliceSource::new(data));
    loop {
        match decoder.next_event() {
            Ok(DecoderEvent::ScanReady(_plan)) => {
                while let Ok(Some(_ecs)) = decoder.next_ecs() {
                    // hand `_ecs` to an entropy decoder
                }
            }
            Ok(DecoderEvent::End) => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
}
```
*/

pub mod bitreader;
pub mod byte_source;
pub mod driver;
pub mod error;
pub mod huffman;
pub mod lexer;
pub mod marker;
pub mod quant;
pub mod scan_composer;
pub mod segments;

pub use driver::{Decoder, DecoderEvent, DecoderLimits, Metadata};
pub use error::JpegError;
