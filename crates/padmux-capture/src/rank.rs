use crate::backend::PadKind;

/// Vendor/product pair of the preferred wireless dongle.
pub(crate) const PREFERRED_DONGLE: (u16, u16) = (0x04B4, 0x2412);

/// Vendor/product pair advertised by the virtual X360 pad.
pub(crate) const VIRTUAL_PAD: (u16, u16) = (0x045E, 0x028E);

/// Judge whether an enumerated device is a virtualization artifact
/// rather than real hardware. Selecting our own virtual pad would
/// feed the sink back into itself.
pub(crate) fn is_likely_virtual(
    name: &str,
    path: Option<&str>,
    vendor_id: u16,
    product_id: u16,
) -> bool {
    if (vendor_id, product_id) == VIRTUAL_PAD {
        return true;
    }
    if has_virtual_marker(name) {
        return true;
    }
    path.is_some_and(has_virtual_marker)
}

fn has_virtual_marker(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("vigem") || text.contains("virtual")
}

fn has_brand_token(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("flydigi") || name.contains("vader")
}

/// Priority of a gamepad-class candidate; lower wins.
pub(crate) fn rank_gamepad(
    name: &str,
    kind: PadKind,
    vendor_id: u16,
    product_id: u16,
) -> u8 {
    if (vendor_id, product_id) == PREFERRED_DONGLE {
        return 0;
    }
    match kind {
        PadKind::Xbox360 | PadKind::XboxOne => 1,
        PadKind::Ps4 | PadKind::Ps5 => 2,
        PadKind::Standard | PadKind::Unknown => {
            if has_brand_token(name) {
                3
            } else {
                4
            }
        }
    }
}

/// Priority of a raw joystick candidate; lower wins.
pub(crate) fn rank_joystick(name: &str, vendor_id: u16, product_id: u16) -> u8 {
    if (vendor_id, product_id) == PREFERRED_DONGLE {
        return 0;
    }
    if has_brand_token(name) {
        return 1;
    }
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_pad_ids_are_rejected() {
        assert!(is_likely_virtual("Xbox 360 Controller", None, 0x045E, 0x028E));
    }

    #[test]
    fn virtual_markers_in_name_or_path_are_rejected() {
        assert!(is_likely_virtual("ViGEm Xbox Pad", None, 0, 0));
        assert!(is_likely_virtual("Generic Virtual Gamepad", None, 0, 0));
        assert!(is_likely_virtual(
            "Pad",
            Some("\\\\?\\hid#vigem_bus"),
            0,
            0
        ));
        assert!(!is_likely_virtual("Wireless Controller", None, 0x054C, 0x09CC));
    }

    #[test]
    fn gamepad_rank_prefers_dongle_over_everything() {
        assert_eq!(rank_gamepad("Anything", PadKind::Unknown, 0x04B4, 0x2412), 0);
        assert_eq!(
            rank_gamepad("Xbox One Pad", PadKind::XboxOne, 0x045E, 0x02EA),
            1
        );
        assert_eq!(rank_gamepad("DualShock", PadKind::Ps4, 0x054C, 0x09CC), 2);
        assert_eq!(
            rank_gamepad("Flydigi Vader 3", PadKind::Standard, 0x1234, 0x0001),
            3
        );
        assert_eq!(
            rank_gamepad("Generic Pad", PadKind::Standard, 0x1234, 0x0001),
            4
        );
    }

    #[test]
    fn joystick_rank_table() {
        assert_eq!(rank_joystick("Dongle", 0x04B4, 0x2412), 0);
        assert_eq!(rank_joystick("VADER 3 Pro", 0x1234, 0x0001), 1);
        assert_eq!(rank_joystick("Old Stick", 0x1234, 0x0001), 10);
    }
}
