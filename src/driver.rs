//! C7: the driver state machine. Threads the lexer (C2), the segment
//! parsers (C3), the Huffman builder (C4), the quantization table store
//! (C5) and the scan composer (C6) together to walk SOI -> headers ->
//! scans -> EOI, honoring DNL and restart-interval sequencing.
//!
//! This is the crate's only public entry point; everything above is an
//! internal collaborator reached through `Decoder`.

use crate::bitreader::BitReader;
use crate::byte_source::ByteSource;
use crate::error::JpegError;
use crate::huffman::HuffmanTable;
use crate::lexer::Lexer;
use crate::marker::Marker;
use crate::quant::{QuantTable, QuantTableStore};
use crate::scan_composer::{self, ProgressionTracker, ScanPlan};
use crate::segments::adobe::AdobeColorTransform;
use crate::segments::dht::HuffmanClass;
use crate::segments::exif::Exif;
use crate::segments::frame::FrameHeader;
use crate::segments::jfif::Jfif;
use crate::segments::{adobe, dht, dnl, dqt, dri, exif, frame, jfif, scan};

/// Construction-time limits, mirroring the teacher crate's small
/// configuration structs (`CodingParameters`, `JpeglsPcParameters`): plain
/// data with a `Default` impl, not a builder. Every field here is fixed by
/// the standard; the struct exists so a caller can see and assert the
/// limits this decoder enforces rather than have them buried in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    /// ITU-T T.81 B.2.3: interleaved-scan sampling volume ceiling.
    pub max_sampling_volume: u32,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self { max_sampling_volume: scan_composer::MAX_SAMPLING_VOLUME }
    }
}

/// Non-actionable metadata surfaced to the caller as it streams past.
/// None of these are interpreted further by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Jfif(Jfif),
    Exif(Exif),
    Adobe(AdobeColorTransform),
    App(u8, Vec<u8>),
    Comment(Vec<u8>),
}

/// One item of the decoder's event stream (see spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    Metadata(Metadata),
    FrameReady(FrameHeader),
    ScanReady(ScanPlan),
    HeightRedefined(u16),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectSoi,
    BeforeFrame,
    AfterFrame,
    InScan,
    Ended,
}

/// The driver. Owns the lexer, the four DQT and eight (DC+AC) DHT slots,
/// the active frame header and its progression tracker, and the restart
/// bookkeeping. Dropping a `Decoder` releases every installed table.
pub struct Decoder<S: ByteSource> {
    lexer: Lexer<S>,
    limits: DecoderLimits,
    state: State,
    quant: QuantTableStore,
    dc_tables: [Option<HuffmanTable>; 4],
    ac_tables: [Option<HuffmanTable>; 4],
    restart_interval: u16,
    frame: Option<FrameHeader>,
    tracker: Option<ProgressionTracker>,
    any_scan_completed: bool,
    dnl_window_open: bool,
    restart_phase: u8,
    /// A marker already consumed from the lexer but not yet dispatched,
    /// left over from ending a scan's entropy-coded run.
    stashed_marker: Option<Marker>,
}

impl<S: ByteSource> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self::with_limits(source, DecoderLimits::default())
    }

    pub fn with_limits(source: S, limits: DecoderLimits) -> Self {
        Self {
            lexer: Lexer::new(source),
            limits,
            state: State::ExpectSoi,
            quant: QuantTableStore::new(),
            dc_tables: Default::default(),
            ac_tables: Default::default(),
            restart_interval: 0,
            frame: None,
            tracker: None,
            any_scan_completed: false,
            dnl_window_open: false,
            restart_phase: 0,
            stashed_marker: None,
        }
    }

    pub fn frame_header(&self) -> Option<&FrameHeader> {
        self.frame.as_ref()
    }

    pub fn quant_table(&self, slot: u8) -> Option<&QuantTable> {
        self.quant.get(slot)
    }

    pub fn dc_table(&self, slot: u8) -> Option<&HuffmanTable> {
        self.dc_tables.get(slot as usize)?.as_ref()
    }

    pub fn ac_table(&self, slot: u8) -> Option<&HuffmanTable> {
        self.ac_tables.get(slot as usize)?.as_ref()
    }

    pub fn restart_interval(&self) -> u16 {
        self.restart_interval
    }

    fn take_marker(&mut self) -> Result<Marker, JpegError> {
        match self.stashed_marker.take() {
            Some(m) => Ok(m),
            None => self.lexer.read_marker(),
        }
    }

    fn install_dqt(&mut self) -> Result<(), JpegError> {
        let payload = self.lexer.read_segment_payload()?;
        for (slot, table) in dqt::parse(&payload)? {
            self.quant.install(slot, table)?;
        }
        Ok(())
    }

    fn install_dht(&mut self) -> Result<(), JpegError> {
        let payload = self.lexer.read_segment_payload()?;
        for entry in dht::parse(&payload)? {
            let table = HuffmanTable::build(&entry.leaf_counts, &entry.leaf_values)?;
            match entry.class {
                HuffmanClass::Dc => self.dc_tables[entry.slot as usize] = Some(table),
                HuffmanClass::Ac => self.ac_tables[entry.slot as usize] = Some(table),
            }
        }
        Ok(())
    }

    fn install_dri(&mut self) -> Result<(), JpegError> {
        let payload = self.lexer.read_segment_payload()?;
        self.restart_interval = dri::parse(&payload)?;
        Ok(())
    }

    fn classify_app(&self, index: u8, payload: Vec<u8>) -> Result<Metadata, JpegError> {
        match index {
            0 if jfif::looks_like_jfif(&payload) => Ok(Metadata::Jfif(jfif::parse(&payload)?)),
            1 if exif::looks_like_exif(&payload) => Ok(Metadata::Exif(exif::parse(&payload)?)),
            14 if adobe::looks_like_adobe(&payload) => Ok(Metadata::Adobe(adobe::parse(&payload)?)),
            n => Ok(Metadata::App(n, payload)),
        }
    }

    /// Advances the state machine and returns the next event. Call
    /// repeatedly until `DecoderEvent::End`; further calls after `End`
    /// keep returning `End`.
    pub fn next_event(&mut self) -> Result<DecoderEvent, JpegError> {
        loop {
            match self.state {
                State::Ended => return Ok(DecoderEvent::End),
                State::ExpectSoi => {
                    let marker = self.take_marker()?;
                    if marker != Marker::StartOfImage {
                        return Err(JpegError::MissingSoi);
                    }
                    self.state = State::BeforeFrame;
                }
                State::BeforeFrame => {
                    if let Some(event) = self.drive_before_frame()? {
                        return Ok(event);
                    }
                }
                State::AfterFrame => {
                    if let Some(event) = self.drive_after_frame()? {
                        return Ok(event);
                    }
                }
                State::InScan => {
                    unreachable!("InScan is only entered and left by next_ecs")
                }
            }
        }
    }

    fn drive_before_frame(&mut self) -> Result<Option<DecoderEvent>, JpegError> {
        let marker = self.take_marker()?;
        match marker {
            Marker::StartOfImage => Err(JpegError::DuplicateSoi),
            Marker::EndOfImage => Err(JpegError::PrematureEoi),
            Marker::StartOfScan => Err(JpegError::PrematureSos),
            Marker::DefineNumberOfLines => Err(JpegError::PrematureDnl),
            Marker::Restart(_) => Err(JpegError::UnexpectedRestart),
            Marker::Unsupported(code) => Err(JpegError::UnsupportedFrameCodingProcess(code)),
            Marker::Sof(encoding, _) => {
                let payload = self.lexer.read_segment_payload()?;
                let header = frame::parse(encoding, &payload)?;
                self.tracker = Some(ProgressionTracker::new(header.components.len()));
                self.frame = Some(header.clone());
                self.state = State::AfterFrame;
                Ok(Some(DecoderEvent::FrameReady(header)))
            }
            Marker::DefineQuantizationTable => {
                self.install_dqt()?;
                Ok(None)
            }
            Marker::DefineHuffmanTable => {
                self.install_dht()?;
                Ok(None)
            }
            Marker::DefineRestartInterval => {
                self.install_dri()?;
                Ok(None)
            }
            Marker::Comment => {
                let payload = self.lexer.read_segment_payload()?;
                Ok(Some(DecoderEvent::Metadata(Metadata::Comment(payload))))
            }
            Marker::App(n) => {
                let payload = self.lexer.read_segment_payload()?;
                Ok(Some(DecoderEvent::Metadata(self.classify_app(n, payload)?)))
            }
        }
    }

    fn drive_after_frame(&mut self) -> Result<Option<DecoderEvent>, JpegError> {
        let marker = self.take_marker()?;
        let dnl_window_was_open = self.dnl_window_open;
        self.dnl_window_open = false;

        match marker {
            Marker::StartOfImage => Err(JpegError::DuplicateSoi),
            Marker::Sof(..) => Err(JpegError::DuplicateSof),
            Marker::EndOfImage => {
                self.state = State::Ended;
                Ok(Some(DecoderEvent::End))
            }
            Marker::Restart(_) => Err(JpegError::UnexpectedRestart),
            Marker::Unsupported(code) => Err(JpegError::UnsupportedFrameCodingProcess(code)),
            Marker::DefineNumberOfLines => {
                if !dnl_window_was_open {
                    return Err(if self.any_scan_completed {
                        JpegError::UnexpectedDnl
                    } else {
                        JpegError::PrematureDnl
                    });
                }
                let payload = self.lexer.read_segment_payload()?;
                let new_height = dnl::parse(&payload)?;
                let frame = self.frame.as_mut().expect("frame set before any scan");
                if frame.height != 0 {
                    return Err(JpegError::UnexpectedDnl);
                }
                frame.height = new_height;
                Ok(Some(DecoderEvent::HeightRedefined(new_height)))
            }
            Marker::DefineQuantizationTable => {
                self.install_dqt()?;
                Ok(None)
            }
            Marker::DefineHuffmanTable => {
                self.install_dht()?;
                Ok(None)
            }
            Marker::DefineRestartInterval => {
                self.install_dri()?;
                Ok(None)
            }
            Marker::Comment => {
                let payload = self.lexer.read_segment_payload()?;
                Ok(Some(DecoderEvent::Metadata(Metadata::Comment(payload))))
            }
            Marker::App(n) => {
                let payload = self.lexer.read_segment_payload()?;
                Ok(Some(DecoderEvent::Metadata(self.classify_app(n, payload)?)))
            }
            Marker::StartOfScan => {
                let payload = self.lexer.read_segment_payload()?;
                let header = scan::parse(&payload)?;
                let frame = self.frame.as_ref().expect("frame set before any scan");
                let tracker = self.tracker.as_mut().expect("tracker set alongside frame");
                let plan = scan_composer::compose_with_volume_limit(
                    frame,
                    &header,
                    &self.dc_tables,
                    &self.ac_tables,
                    tracker,
                    self.limits.max_sampling_volume,
                )?;
                self.restart_phase = 0;
                self.state = State::InScan;
                Ok(Some(DecoderEvent::ScanReady(plan)))
            }
        }
    }

    /// Pulls the next entropy-coded segment of the scan currently open
    /// (the caller must have just received `ScanReady`, or a prior call
    /// to this method that returned `Some`). Returns `None` once the scan
    /// has ended; the marker that ended it is dispatched by the following
    /// `next_event` call.
    pub fn next_ecs(&mut self) -> Result<Option<BitReader>, JpegError> {
        if self.state != State::InScan {
            return Ok(None);
        }
        let (bytes, terminator) = self.lexer.read_ecs()?;
        match terminator {
            Marker::Restart(phase) => {
                if self.restart_interval == 0 {
                    return Err(JpegError::MissingRestartInterval);
                }
                let expected = self.restart_phase;
                if phase != expected {
                    return Err(JpegError::InvalidRestartPhase { expected });
                }
                self.restart_phase = (self.restart_phase + 1) % 8;
            }
            other => {
                let is_first_scan = !self.any_scan_completed;
                self.stashed_marker = Some(other);
                self.state = State::AfterFrame;
                self.any_scan_completed = true;
                self.dnl_window_open = is_first_scan;
            }
        }
        Ok(Some(BitReader::new(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_source::SliceSource;

    fn drain_scan<S: ByteSource>(decoder: &mut Decoder<S>) -> usize {
        let mut count = 0;
        while decoder.next_ecs().unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[test]
    fn e1_minimal_stream_is_premature_eoi() {
        let data = [0xFF, 0xD8, 0xFF, 0xD9];
        let mut decoder = Decoder::new(SliceSource::new(&data));
        assert_eq!(decoder.next_event(), Err(JpegError::PrematureEoi));
    }

    #[test]
    fn e2_jfif_only_stream() {
        let data = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x02, 0x00,
            0x00, 0x48, 0x00, 0x48, 0x00, 0x00, 0xFF, 0xD9,
        ];
        let mut decoder = Decoder::new(SliceSource::new(&data));
        let event = decoder.next_event().unwrap();
        match event {
            DecoderEvent::Metadata(Metadata::Jfif(jfif)) => {
                assert_eq!(jfif.version, (1, 2));
                assert_eq!(jfif.x_density, 72);
                assert_eq!(jfif.y_density, 72);
            }
            other => panic!("expected JFIF metadata, got {other:?}"),
        }
        assert_eq!(decoder.next_event(), Err(JpegError::PrematureEoi));
    }

    #[test]
    fn rejects_stream_missing_soi() {
        let data = [0xFF, 0xD9];
        let mut decoder = Decoder::new(SliceSource::new(&data));
        assert_eq!(decoder.next_event(), Err(JpegError::MissingSoi));
    }

    #[test]
    fn rejects_duplicate_soi() {
        let data = [0xFF, 0xD8, 0xFF, 0xD8];
        let mut decoder = Decoder::new(SliceSource::new(&data));
        decoder.next_event().unwrap();
        assert_eq!(decoder.next_event(), Err(JpegError::DuplicateSoi));
    }

    fn luminance_dc_dht() -> Vec<u8> {
        let mut payload = vec![0x00]; // class DC, slot 0
        payload.extend_from_slice(&[0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
        payload.extend_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        payload
    }

    fn with_length(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        let len = (payload.len() + 2) as u16;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn single_component_baseline_stream(ecs: &[u8]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xDB, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&[1u8; 64]);
            p
        }));
        data.extend(with_length(0xC4, &luminance_dc_dht()));
        data.extend(with_length(0xC4, &{
            let mut p = vec![0x10]; // class AC, slot 0
            p.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            p.push(0);
            p
        }));
        data.extend(with_length(
            0xC0,
            &[8, 0, 8, 0, 8, 1, 1, 0x11, 0, 0x01, 0x11, 0],
        ));
        data.extend(with_length(0xDA, &[1, 1, 0x00, 0, 63, 0]));
        data.extend_from_slice(ecs);
        data.push(0xFF);
        data.push(0xD9);
        data
    }

    #[test]
    fn e3_dqt_install_round_trips_zigzag_values() {
        let mut payload = vec![0x00];
        payload.extend((1u16..=64).map(|v| v as u8));
        let data = {
            let mut v = vec![0xFF, 0xD8];
            v.extend(with_length(0xDB, &payload));
            v.push(0xFF);
            v.push(0xD9);
            v
        };
        let mut decoder = Decoder::new(SliceSource::new(&data));
        decoder.next_event().unwrap();
        let table = decoder.quant_table(0).unwrap();
        assert_eq!(table.values[0], 1);
        assert_eq!(table.values[63], 64);
    }

    #[test]
    fn full_baseline_scan_runs_to_end_of_image() {
        let data = single_component_baseline_stream(&[0xAB, 0xCD]);
        let mut decoder = Decoder::new(SliceSource::new(&data));
        loop {
            match decoder.next_event().unwrap() {
                DecoderEvent::FrameReady(header) => assert_eq!(header.width, 8),
                DecoderEvent::ScanReady(plan) => {
                    assert_eq!(plan.components.len(), 1);
                    let count = drain_scan(&mut decoder);
                    assert_eq!(count, 1);
                }
                DecoderEvent::End => break,
                _ => {}
            }
        }
    }

    #[test]
    fn e5_byte_stuffed_restart_sequence() {
        // A one-byte restart interval, two ECS chunks separated by RST0.
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xDB, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&[1u8; 64]);
            p
        }));
        data.extend(with_length(0xC4, &luminance_dc_dht()));
        data.extend(with_length(0xC4, &{
            let mut p = vec![0x10];
            p.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            p.push(0);
            p
        }));
        data.extend(with_length(0xDD, &1u16.to_be_bytes()));
        data.extend(with_length(
            0xC0,
            &[8, 0, 8, 0, 8, 1, 1, 0x11, 0, 0x01, 0x11, 0],
        ));
        data.extend(with_length(0xDA, &[1, 1, 0x00, 0, 63, 0]));
        data.extend_from_slice(&[0xFF, 0x00, 0x12, 0xFF, 0xD0]); // ECS, RST0
        data.extend_from_slice(&[0x34]); // second ECS
        data.push(0xFF);
        data.push(0xD9);

        let mut decoder = Decoder::new(SliceSource::new(&data));
        loop {
            match decoder.next_event().unwrap() {
                DecoderEvent::ScanReady(_) => {
                    let first = decoder.next_ecs().unwrap().unwrap();
                    // 0xFF 0x00 collapses to a literal 0xFF.
                    assert_eq!(first.peek(16), 0xFF12);
                    let second = decoder.next_ecs().unwrap().unwrap();
                    assert_eq!(second.peek(8), 0x34);
                    assert!(decoder.next_ecs().unwrap().is_none());
                }
                DecoderEvent::End => break,
                _ => {}
            }
        }
    }

    #[test]
    fn e6_restart_phase_violation_is_rejected() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xDB, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&[1u8; 64]);
            p
        }));
        data.extend(with_length(0xC4, &luminance_dc_dht()));
        data.extend(with_length(0xC4, &{
            let mut p = vec![0x10];
            p.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            p.push(0);
            p
        }));
        data.extend(with_length(0xDD, &1u16.to_be_bytes()));
        data.extend(with_length(
            0xC0,
            &[8, 0, 8, 0, 8, 1, 1, 0x11, 0, 0x01, 0x11, 0],
        ));
        data.extend(with_length(0xDA, &[1, 1, 0x00, 0, 63, 0]));
        // RST2 where RST0 was expected.
        data.extend_from_slice(&[0x01, 0xFF, 0xD2]);
        data.push(0xFF);
        data.push(0xD9);

        let mut decoder = Decoder::new(SliceSource::new(&data));
        loop {
            match decoder.next_event().unwrap() {
                DecoderEvent::ScanReady(_) => {
                    assert_eq!(
                        decoder.next_ecs(),
                        Err(JpegError::InvalidRestartPhase { expected: 0 })
                    );
                    return;
                }
                DecoderEvent::End => panic!("expected a restart phase error before End"),
                _ => {}
            }
        }
    }

    #[test]
    fn missing_restart_interval_definition_is_an_error() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xDB, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&[1u8; 64]);
            p
        }));
        data.extend(with_length(0xC4, &luminance_dc_dht()));
        data.extend(with_length(0xC4, &{
            let mut p = vec![0x10];
            p.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            p.push(0);
            p
        }));
        data.extend(with_length(
            0xC0,
            &[8, 0, 8, 0, 8, 1, 1, 0x11, 0, 0x01, 0x11, 0],
        ));
        data.extend(with_length(0xDA, &[1, 1, 0x00, 0, 63, 0]));
        data.extend_from_slice(&[0x01, 0xFF, 0xD0]); // RST0 with no DRI ever seen
        data.push(0xFF);
        data.push(0xD9);

        let mut decoder = Decoder::new(SliceSource::new(&data));
        loop {
            match decoder.next_event().unwrap() {
                DecoderEvent::ScanReady(_) => {
                    assert_eq!(decoder.next_ecs(), Err(JpegError::MissingRestartInterval));
                    return;
                }
                DecoderEvent::End => panic!("expected a missing-restart-interval error"),
                _ => {}
            }
        }
    }

    #[test]
    fn dnl_redefines_deferred_height_once() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xDB, &{
            let mut p = vec![0x00];
            p.extend_from_slice(&[1u8; 64]);
            p
        }));
        data.extend(with_length(0xC4, &luminance_dc_dht()));
        data.extend(with_length(0xC4, &{
            let mut p = vec![0x10];
            p.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
            p.push(0);
            p
        }));
        // Height 0: deferred to DNL.
        data.extend(with_length(
            0xC0,
            &[8, 0, 0, 0, 8, 1, 1, 0x11, 0, 0x01, 0x11, 0],
        ));
        data.extend(with_length(0xDA, &[1, 1, 0x00, 0, 63, 0]));
        data.extend_from_slice(&[0xAB]);
        data.extend(with_length(0xDC, &100u16.to_be_bytes()));
        data.push(0xFF);
        data.push(0xD9);

        let mut decoder = Decoder::new(SliceSource::new(&data));
        let mut saw_height_redefined = false;
        loop {
            match decoder.next_event().unwrap() {
                DecoderEvent::ScanReady(_) => {
                    drain_scan(&mut decoder);
                }
                DecoderEvent::HeightRedefined(h) => {
                    assert_eq!(h, 100);
                    saw_height_redefined = true;
                }
                DecoderEvent::End => break,
                _ => {}
            }
        }
        assert!(saw_height_redefined);
    }

    #[test]
    fn unsupported_frame_coding_process_is_rejected() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(with_length(0xC3, &[8, 0, 8, 0, 8, 1, 1, 0x11, 0]));
        let mut decoder = Decoder::new(SliceSource::new(&data));
        assert_eq!(
            decoder.next_event(),
            Err(JpegError::UnsupportedFrameCodingProcess(0xC3))
        );
    }
}
