//! DICOM group names.
//!
//! Names follow the usual grouping of attributes by group number,
//! and are used for instance to address every attribute of a group at once.
use dwv_core::header::GroupNumber;

static GROUP_NAMES: &[(GroupNumber, &str)] = &[
    (0x0000, "Command"),
    (0x0002, "Meta Element"),
    (0x0004, "File Set"),
    (0x0008, "Identifying"),
    (0x0010, "Patient"),
    (0x0012, "Clinical Trial"),
    (0x0018, "Acquisition"),
    (0x0020, "Relationship"),
    (0x0022, "Ophthalmology"),
    (0x0028, "Image Presentation"),
    (0x0032, "Study"),
    (0x0038, "Visit"),
    (0x003A, "Waveform"),
    (0x0040, "Procedure"),
    (0x0042, "Encapsulated Document"),
    (0x0050, "Device Information"),
    (0x0054, "Nuclear Medicine"),
    (0x0060, "Histogram"),
    (0x0062, "Segmentation"),
    (0x0064, "Deformable Registration"),
    (0x0066, "Surface"),
    (0x0070, "Presentation State"),
    (0x0072, "Hanging Protocol"),
    (0x0088, "Storage"),
    (0x0100, "Authorization"),
    (0x0400, "Digital Signature"),
    (0x2000, "Film Session"),
    (0x2010, "Film Box"),
    (0x2020, "Image Box"),
    (0x3002, "RT Image"),
    (0x3004, "RT Dose"),
    (0x3006, "RT Structure Set"),
    (0x3008, "RT Treatment"),
    (0x300A, "RT Plan"),
    (0x300C, "RT Relationship"),
    (0x300E, "RT Approval"),
    (0x4000, "Text"),
    (0x4008, "Results"),
    (0x4FFE, "MAC Parameters"),
    (0x5200, "Functional Groups"),
    (0x5400, "Waveform Data"),
    (0x6000, "Overlay"),
    (0x7FE0, "Pixel Data"),
    (0xFFFA, "Digital Signatures"),
    (0xFFFC, "Generic"),
    (0xFFFE, "Delimitation"),
];

/// Retrieve the name of the given group, if it is known.
///
/// Overlay groups `60xx` all resolve to `"Overlay"`.
/// Private groups have no name.
pub fn group_name(group: GroupNumber) -> Option<&'static str> {
    if group & 1 == 1 {
        return None;
    }
    let group = if group & 0xFF00 == 0x6000 { 0x6000 } else { group };
    GROUP_NAMES
        .binary_search_by_key(&group, |(g, _)| *g)
        .ok()
        .map(|i| GROUP_NAMES[i].1)
}

/// Retrieve the group number with the given name.
pub fn group_by_name(name: &str) -> Option<GroupNumber> {
    GROUP_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(g, _)| *g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_groups() {
        assert_eq!(group_name(0x0002), Some("Meta Element"));
        assert_eq!(group_name(0x0010), Some("Patient"));
        assert_eq!(group_name(0x7FE0), Some("Pixel Data"));
        assert_eq!(group_name(0x6002), Some("Overlay"));
        assert_eq!(group_name(0x0009), None);
        assert_eq!(group_name(0x0006), None);
        assert_eq!(group_by_name("Image Presentation"), Some(0x0028));
    }

    #[test]
    fn table_is_sorted() {
        assert!(GROUP_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
