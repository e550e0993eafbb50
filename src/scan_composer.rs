//! C6: the scan composer. Cross-references a parsed SOS against the active
//! frame header, the installed Huffman/quantization tables, and the
//! running progressive-refinement state, producing a `ScanPlan` the
//! driver hands off to entropy decoding.

use crate::error::JpegError;
use crate::huffman::HuffmanTable;
use crate::marker::FrameEncoding;
use crate::segments::frame::FrameHeader;
use crate::segments::scan::ScanHeader;

/// Maximum interleaved-scan sampling volume (sum of h*v across the scan's
/// components) permitted by ITU-T T.81 B.2.3.
pub const MAX_SAMPLING_VOLUME: u32 = 10;

/// Maximum Huffman table slot usable by a baseline frame (baseline limits
/// each class to two tables, selectors 0 and 1).
const BASELINE_MAX_HUFFMAN_SLOT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPlanComponent {
    pub frame_index: usize,
    pub dc_selector: u8,
    pub ac_selector: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub ss: u8,
    pub se: u8,
    pub ah: u8,
    pub al: u8,
    pub components: Vec<ScanPlanComponent>,
}

/// Tracks, per frame component and per zigzag coefficient index, the most
/// recent Al bit-plane written, so successive progressive scans are
/// verified to refine monotonically.
#[derive(Debug, Clone)]
pub struct ProgressionTracker {
    al_state: Vec<[Option<u8>; 64]>,
}

impl ProgressionTracker {
    pub fn new(component_count: usize) -> Self {
        Self { al_state: vec![[None; 64]; component_count] }
    }

    fn record(&mut self, component: usize, z: usize, ah: u8, al: u8) -> Result<(), JpegError> {
        let cell = &mut self.al_state[component][z];
        match *cell {
            None => {
                if ah != 0 {
                    return Err(JpegError::NonMonotonicRefinement { ah, al });
                }
            }
            Some(prev_al) => {
                if ah != prev_al || al + 1 != prev_al {
                    return Err(JpegError::NonMonotonicRefinement { ah, al });
                }
            }
        }
        *cell = Some(al);
        Ok(())
    }

    fn validate(&mut self, scan: &ScanHeader, frame_indices: &[usize]) -> Result<(), JpegError> {
        if scan.ss == 0 {
            if scan.se != 0 {
                return Err(JpegError::InvalidSpectralSelection { ss: scan.ss, se: scan.se });
            }
            for &component in frame_indices {
                self.record(component, 0, scan.ah, scan.al)?;
            }
        } else {
            for &component in frame_indices {
                for z in scan.ss as usize..=scan.se as usize {
                    self.record(component, z, scan.ah, scan.al)?;
                }
            }
        }
        Ok(())
    }
}

fn huffman_slot_limit(encoding: FrameEncoding) -> u8 {
    match encoding {
        FrameEncoding::Baseline => BASELINE_MAX_HUFFMAN_SLOT,
        FrameEncoding::ExtendedSequential | FrameEncoding::Progressive => 3,
    }
}

pub fn compose(
    frame: &FrameHeader,
    scan: &ScanHeader,
    dc_tables: &[Option<HuffmanTable>; 4],
    ac_tables: &[Option<HuffmanTable>; 4],
    tracker: &mut ProgressionTracker,
) -> Result<ScanPlan, JpegError> {
    compose_with_volume_limit(frame, scan, dc_tables, ac_tables, tracker, MAX_SAMPLING_VOLUME)
}

/// As `compose`, but with the sampling-volume ceiling threaded through
/// rather than hardcoded, for callers that expose it as a named limit
/// (see `driver::DecoderLimits`).
pub fn compose_with_volume_limit(
    frame: &FrameHeader,
    scan: &ScanHeader,
    dc_tables: &[Option<HuffmanTable>; 4],
    ac_tables: &[Option<HuffmanTable>; 4],
    tracker: &mut ProgressionTracker,
    max_sampling_volume: u32,
) -> Result<ScanPlan, JpegError> {
    let mut components = Vec::with_capacity(scan.components.len());
    let mut frame_indices = Vec::with_capacity(scan.components.len());
    let mut volume: u32 = 0;
    let slot_limit = huffman_slot_limit(frame.encoding);

    let mut last_index: Option<usize> = None;
    for sc in &scan.components {
        let frame_index = frame.index_of(sc.id).ok_or(JpegError::UndefinedScanComponent(sc.id))?;
        if let Some(last) = last_index {
            if frame_index <= last {
                return Err(JpegError::ScanComponentOrderViolation);
            }
        }
        last_index = Some(frame_index);

        let fc = &frame.components[frame_index];
        volume += fc.h as u32 * fc.v as u32;
        frame_indices.push(frame_index);
        components.push(ScanPlanComponent {
            frame_index,
            dc_selector: sc.dc_selector,
            ac_selector: sc.ac_selector,
        });
    }

    if scan.components.len() > 1 && volume > max_sampling_volume {
        return Err(JpegError::InvalidSamplingVolume(volume));
    }

    let is_dc_scan = scan.ss == 0;
    let needs_dc = frame.encoding != FrameEncoding::Progressive || is_dc_scan;
    let needs_ac = frame.encoding != FrameEncoding::Progressive || !is_dc_scan;

    for sc in &scan.components {
        if needs_dc {
            if sc.dc_selector > slot_limit || dc_tables[sc.dc_selector as usize].is_none() {
                return Err(JpegError::UndefinedDcHuffmanSlot(sc.dc_selector));
            }
        }
        if needs_ac {
            if sc.ac_selector > slot_limit || ac_tables[sc.ac_selector as usize].is_none() {
                return Err(JpegError::UndefinedAcHuffmanSlot(sc.ac_selector));
            }
        }
    }

    // Successive-approximation/spectral-selection refinement tracking is a
    // progressive-only concept; sequential coding fixes band = 0..63 with
    // no bit-plane refinement, so there is nothing for the tracker to check.
    if frame.encoding == FrameEncoding::Progressive {
        tracker.validate(scan, &frame_indices)?;
    }

    Ok(ScanPlan { ss: scan.ss, se: scan.se, ah: scan.ah, al: scan.al, components })
}
