use crate::config::CobsConfig;
use crate::error::WireError;
use crate::group::run_len;

/// One group as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupInfo {
    /// Offset of the length byte within the frame.
    pub offset: usize,

    /// The raw length byte.
    pub code: u8,

    /// Data bytes physically present after the length byte.
    pub data_len: usize,

    /// The decoder re-inserts a sentinel byte between this group and the
    /// next one.
    pub sentinel_follows: bool,

    /// COBS/R tail: the length byte is itself the last payload byte.
    pub reduced_tail: bool,
}

/// Group-by-group breakdown of one encoded frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLayout {
    pub groups: Vec<GroupInfo>,

    /// Payload length the frame decodes to.
    pub decoded_len: usize,
}

/// Walk the groups of a single frame without decoding it.
///
/// `frame` must not include the terminating sentinel. The walk follows the
/// same rules as the streaming decoder, so `decoded_len` equals the length
/// of the decoded payload for every frame the decoder accepts.
///
/// ```text
///   "\x06 1 2 3 4 5 \x05 6 7 8 9"
///    ├────────────┤ ├──────────┤
///    code 0x06      code 0x05
///    5 data bytes   4 data bytes
///    sentinel_follows
/// ```
///
/// # Errors
///
/// - [`WireError::UnexpectedSentinel`] if a literal sentinel appears.
/// - [`WireError::TruncatedGroup`] if the last group is short and the
///   configuration is not reduced.
pub fn scan_frame(frame: &[u8], config: &CobsConfig) -> Result<FrameLayout, WireError> {
    let sentinel = config.sentinel;
    let full_code = config.max_code();
    let mut layout = FrameLayout::default();
    let mut offset = 0;

    while offset < frame.len() {
        let code = frame[offset];
        if code == sentinel {
            return Err(WireError::UnexpectedSentinel { offset, sentinel });
        }

        let start = offset + 1;
        let declared = usize::from(run_len(code, sentinel));
        let available = frame.len() - start;

        let (data_len, reduced_tail) = if declared <= available {
            (declared, false)
        } else if config.reduced {
            (available, true)
        } else {
            return Err(WireError::TruncatedGroup {
                offset,
                declared,
                available,
            });
        };

        let data = &frame[start..start + data_len];
        if let Some(pos) = data.iter().position(|&b| b == sentinel) {
            return Err(WireError::UnexpectedSentinel {
                offset: start + pos,
                sentinel,
            });
        }

        // A group that is not full ended early on a payload sentinel.
        if let Some(prev) = layout.groups.last_mut() {
            if prev.code != full_code {
                prev.sentinel_follows = true;
                layout.decoded_len += 1;
            }
        }

        layout.decoded_len += data_len + usize::from(reduced_tail);
        layout.groups.push(GroupInfo {
            offset,
            code,
            data_len,
            sentinel_follows: false,
            reduced_tail,
        });

        offset = start + data_len;
    }

    Ok(layout)
}
