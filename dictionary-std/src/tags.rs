//! Tag constants of the curated standard dictionary.
//!
//! Each constant maps an attribute keyword to its DICOM tag.
//! Overlay attributes of the repeating group `60xx`
//! are declared with their base group `6000`.
use crate::data_element::{VM_1, VM_1_N, VM_2, VM_2_N, VM_3, VM_6};
use dwv_core::dictionary::{DataDictionaryEntryRef, TagRange::*};
use dwv_core::{Tag, VR};

type E = DataDictionaryEntryRef<'static>;

macro_rules! declare_tags {
    (
        $( $name: ident = ($group: literal, $elem: literal), $alias: literal, $vr: ident, $vm: ident, $range: ident; )*
    ) => {
        $(
            #[doc = concat!("(", stringify!($group), ",", stringify!($elem), ") ", $alias)]
            pub const $name: Tag = Tag($group, $elem);
        )*

        /// All entries of the dictionary.
        pub(crate) const ENTRIES: &[E] = &[
            $(
                E {
                    tag: $range($name),
                    alias: $alias,
                    vr: VR::$vr,
                    vm: $vm,
                },
            )*
        ];
    };
}

declare_tags! {
    FILE_META_INFORMATION_GROUP_LENGTH = (0x0002, 0x0000), "FileMetaInformationGroupLength", UL, VM_1, Single;
    FILE_META_INFORMATION_VERSION = (0x0002, 0x0001), "FileMetaInformationVersion", OB, VM_1, Single;
    MEDIA_STORAGE_SOP_CLASS_UID = (0x0002, 0x0002), "MediaStorageSOPClassUID", UI, VM_1, Single;
    MEDIA_STORAGE_SOP_INSTANCE_UID = (0x0002, 0x0003), "MediaStorageSOPInstanceUID", UI, VM_1, Single;
    TRANSFER_SYNTAX_UID = (0x0002, 0x0010), "TransferSyntaxUID", UI, VM_1, Single;
    IMPLEMENTATION_CLASS_UID = (0x0002, 0x0012), "ImplementationClassUID", UI, VM_1, Single;
    IMPLEMENTATION_VERSION_NAME = (0x0002, 0x0013), "ImplementationVersionName", SH, VM_1, Single;
    SOURCE_APPLICATION_ENTITY_TITLE = (0x0002, 0x0016), "SourceApplicationEntityTitle", AE, VM_1, Single;
    PRIVATE_INFORMATION_CREATOR_UID = (0x0002, 0x0100), "PrivateInformationCreatorUID", UI, VM_1, Single;
    PRIVATE_INFORMATION = (0x0002, 0x0102), "PrivateInformation", OB, VM_1, Single;
    SPECIFIC_CHARACTER_SET = (0x0008, 0x0005), "SpecificCharacterSet", CS, VM_1_N, Single;
    IMAGE_TYPE = (0x0008, 0x0008), "ImageType", CS, VM_2_N, Single;
    INSTANCE_CREATION_DATE = (0x0008, 0x0012), "InstanceCreationDate", DA, VM_1, Single;
    INSTANCE_CREATION_TIME = (0x0008, 0x0013), "InstanceCreationTime", TM, VM_1, Single;
    INSTANCE_CREATOR_UID = (0x0008, 0x0014), "InstanceCreatorUID", UI, VM_1, Single;
    SOP_CLASS_UID = (0x0008, 0x0016), "SOPClassUID", UI, VM_1, Single;
    SOP_INSTANCE_UID = (0x0008, 0x0018), "SOPInstanceUID", UI, VM_1, Single;
    STUDY_DATE = (0x0008, 0x0020), "StudyDate", DA, VM_1, Single;
    SERIES_DATE = (0x0008, 0x0021), "SeriesDate", DA, VM_1, Single;
    ACQUISITION_DATE = (0x0008, 0x0022), "AcquisitionDate", DA, VM_1, Single;
    CONTENT_DATE = (0x0008, 0x0023), "ContentDate", DA, VM_1, Single;
    ACQUISITION_DATE_TIME = (0x0008, 0x002A), "AcquisitionDateTime", DT, VM_1, Single;
    STUDY_TIME = (0x0008, 0x0030), "StudyTime", TM, VM_1, Single;
    SERIES_TIME = (0x0008, 0x0031), "SeriesTime", TM, VM_1, Single;
    ACQUISITION_TIME = (0x0008, 0x0032), "AcquisitionTime", TM, VM_1, Single;
    CONTENT_TIME = (0x0008, 0x0033), "ContentTime", TM, VM_1, Single;
    ACCESSION_NUMBER = (0x0008, 0x0050), "AccessionNumber", SH, VM_1, Single;
    MODALITY = (0x0008, 0x0060), "Modality", CS, VM_1, Single;
    CONVERSION_TYPE = (0x0008, 0x0064), "ConversionType", CS, VM_1, Single;
    MANUFACTURER = (0x0008, 0x0070), "Manufacturer", LO, VM_1, Single;
    INSTITUTION_NAME = (0x0008, 0x0080), "InstitutionName", LO, VM_1, Single;
    INSTITUTION_ADDRESS = (0x0008, 0x0081), "InstitutionAddress", ST, VM_1, Single;
    REFERRING_PHYSICIAN_NAME = (0x0008, 0x0090), "ReferringPhysicianName", PN, VM_1, Single;
    REFERRING_PHYSICIAN_ADDRESS = (0x0008, 0x0092), "ReferringPhysicianAddress", ST, VM_1, Single;
    REFERRING_PHYSICIAN_TELEPHONE_NUMBERS = (0x0008, 0x0094), "ReferringPhysicianTelephoneNumbers", SH, VM_1_N, Single;
    CODE_VALUE = (0x0008, 0x0100), "CodeValue", SH, VM_1, Single;
    CODING_SCHEME_DESIGNATOR = (0x0008, 0x0102), "CodingSchemeDesignator", SH, VM_1, Single;
    CODE_MEANING = (0x0008, 0x0104), "CodeMeaning", LO, VM_1, Single;
    TIMEZONE_OFFSET_FROM_UTC = (0x0008, 0x0201), "TimezoneOffsetFromUTC", SH, VM_1, Single;
    STATION_NAME = (0x0008, 0x1010), "StationName", SH, VM_1, Single;
    STUDY_DESCRIPTION = (0x0008, 0x1030), "StudyDescription", LO, VM_1, Single;
    PROCEDURE_CODE_SEQUENCE = (0x0008, 0x1032), "ProcedureCodeSequence", SQ, VM_1, Single;
    SERIES_DESCRIPTION = (0x0008, 0x103E), "SeriesDescription", LO, VM_1, Single;
    INSTITUTIONAL_DEPARTMENT_NAME = (0x0008, 0x1040), "InstitutionalDepartmentName", LO, VM_1, Single;
    PHYSICIANS_OF_RECORD = (0x0008, 0x1048), "PhysiciansOfRecord", PN, VM_1_N, Single;
    PERFORMING_PHYSICIAN_NAME = (0x0008, 0x1050), "PerformingPhysicianName", PN, VM_1_N, Single;
    NAME_OF_PHYSICIANS_READING_STUDY = (0x0008, 0x1060), "NameOfPhysiciansReadingStudy", PN, VM_1_N, Single;
    OPERATORS_NAME = (0x0008, 0x1070), "OperatorsName", PN, VM_1_N, Single;
    MANUFACTURER_MODEL_NAME = (0x0008, 0x1090), "ManufacturerModelName", LO, VM_1, Single;
    REFERENCED_PERFORMED_PROCEDURE_STEP_SEQUENCE = (0x0008, 0x1111), "ReferencedPerformedProcedureStepSequence", SQ, VM_1, Single;
    REFERENCED_IMAGE_SEQUENCE = (0x0008, 0x1140), "ReferencedImageSequence", SQ, VM_1, Single;
    REFERENCED_SOP_CLASS_UID = (0x0008, 0x1150), "ReferencedSOPClassUID", UI, VM_1, Single;
    REFERENCED_SOP_INSTANCE_UID = (0x0008, 0x1155), "ReferencedSOPInstanceUID", UI, VM_1, Single;
    ANATOMIC_REGION_SEQUENCE = (0x0008, 0x2218), "AnatomicRegionSequence", SQ, VM_1, Single;
    PATIENT_NAME = (0x0010, 0x0010), "PatientName", PN, VM_1, Single;
    PATIENT_ID = (0x0010, 0x0020), "PatientID", LO, VM_1, Single;
    ISSUER_OF_PATIENT_ID = (0x0010, 0x0021), "IssuerOfPatientID", LO, VM_1, Single;
    PATIENT_BIRTH_DATE = (0x0010, 0x0030), "PatientBirthDate", DA, VM_1, Single;
    PATIENT_BIRTH_TIME = (0x0010, 0x0032), "PatientBirthTime", TM, VM_1, Single;
    PATIENT_SEX = (0x0010, 0x0040), "PatientSex", CS, VM_1, Single;
    OTHER_PATIENT_I_DS = (0x0010, 0x1000), "OtherPatientIDs", LO, VM_1_N, Single;
    OTHER_PATIENT_NAMES = (0x0010, 0x1001), "OtherPatientNames", PN, VM_1_N, Single;
    OTHER_PATIENT_I_DS_SEQUENCE = (0x0010, 0x1002), "OtherPatientIDsSequence", SQ, VM_1, Single;
    PATIENT_AGE = (0x0010, 0x1010), "PatientAge", AS, VM_1, Single;
    PATIENT_SIZE = (0x0010, 0x1020), "PatientSize", DS, VM_1, Single;
    PATIENT_WEIGHT = (0x0010, 0x1030), "PatientWeight", DS, VM_1, Single;
    PATIENT_ADDRESS = (0x0010, 0x1040), "PatientAddress", LO, VM_1, Single;
    PATIENT_TELEPHONE_NUMBERS = (0x0010, 0x2154), "PatientTelephoneNumbers", SH, VM_1_N, Single;
    PATIENT_COMMENTS = (0x0010, 0x4000), "PatientComments", LT, VM_1, Single;
    BODY_PART_EXAMINED = (0x0018, 0x0015), "BodyPartExamined", CS, VM_1, Single;
    SLICE_THICKNESS = (0x0018, 0x0050), "SliceThickness", DS, VM_1, Single;
    KVP = (0x0018, 0x0060), "KVP", DS, VM_1, Single;
    SPACING_BETWEEN_SLICES = (0x0018, 0x0088), "SpacingBetweenSlices", DS, VM_1, Single;
    DEVICE_SERIAL_NUMBER = (0x0018, 0x1000), "DeviceSerialNumber", LO, VM_1, Single;
    SOFTWARE_VERSIONS = (0x0018, 0x1020), "SoftwareVersions", LO, VM_1_N, Single;
    PROTOCOL_NAME = (0x0018, 0x1030), "ProtocolName", LO, VM_1, Single;
    FRAME_TIME = (0x0018, 0x1063), "FrameTime", DS, VM_1, Single;
    FRAME_TIME_VECTOR = (0x0018, 0x1065), "FrameTimeVector", DS, VM_1_N, Single;
    EXPOSURE_TIME = (0x0018, 0x1150), "ExposureTime", IS, VM_1, Single;
    X_RAY_TUBE_CURRENT = (0x0018, 0x1151), "XRayTubeCurrent", IS, VM_1, Single;
    IMAGER_PIXEL_SPACING = (0x0018, 0x1164), "ImagerPixelSpacing", DS, VM_2, Single;
    PATIENT_POSITION = (0x0018, 0x5100), "PatientPosition", CS, VM_1, Single;
    STUDY_INSTANCE_UID = (0x0020, 0x000D), "StudyInstanceUID", UI, VM_1, Single;
    SERIES_INSTANCE_UID = (0x0020, 0x000E), "SeriesInstanceUID", UI, VM_1, Single;
    STUDY_ID = (0x0020, 0x0010), "StudyID", SH, VM_1, Single;
    SERIES_NUMBER = (0x0020, 0x0011), "SeriesNumber", IS, VM_1, Single;
    ACQUISITION_NUMBER = (0x0020, 0x0012), "AcquisitionNumber", IS, VM_1, Single;
    INSTANCE_NUMBER = (0x0020, 0x0013), "InstanceNumber", IS, VM_1, Single;
    PATIENT_ORIENTATION = (0x0020, 0x0020), "PatientOrientation", CS, VM_2, Single;
    IMAGE_POSITION_PATIENT = (0x0020, 0x0032), "ImagePositionPatient", DS, VM_3, Single;
    IMAGE_ORIENTATION_PATIENT = (0x0020, 0x0037), "ImageOrientationPatient", DS, VM_6, Single;
    FRAME_OF_REFERENCE_UID = (0x0020, 0x0052), "FrameOfReferenceUID", UI, VM_1, Single;
    LATERALITY = (0x0020, 0x0060), "Laterality", CS, VM_1, Single;
    TEMPORAL_POSITION_IDENTIFIER = (0x0020, 0x0100), "TemporalPositionIdentifier", IS, VM_1, Single;
    NUMBER_OF_TEMPORAL_POSITIONS = (0x0020, 0x0105), "NumberOfTemporalPositions", IS, VM_1, Single;
    SLICE_LOCATION = (0x0020, 0x1041), "SliceLocation", DS, VM_1, Single;
    IMAGE_COMMENTS = (0x0020, 0x4000), "ImageComments", LT, VM_1, Single;
    STACK_ID = (0x0020, 0x9056), "StackID", SH, VM_1, Single;
    IN_STACK_POSITION_NUMBER = (0x0020, 0x9057), "InStackPositionNumber", UL, VM_1, Single;
    PLANE_POSITION_SEQUENCE = (0x0020, 0x9113), "PlanePositionSequence", SQ, VM_1, Single;
    PLANE_ORIENTATION_SEQUENCE = (0x0020, 0x9116), "PlaneOrientationSequence", SQ, VM_1, Single;
    SAMPLES_PER_PIXEL = (0x0028, 0x0002), "SamplesPerPixel", US, VM_1, Single;
    PHOTOMETRIC_INTERPRETATION = (0x0028, 0x0004), "PhotometricInterpretation", CS, VM_1, Single;
    PLANAR_CONFIGURATION = (0x0028, 0x0006), "PlanarConfiguration", US, VM_1, Single;
    NUMBER_OF_FRAMES = (0x0028, 0x0008), "NumberOfFrames", IS, VM_1, Single;
    FRAME_INCREMENT_POINTER = (0x0028, 0x0009), "FrameIncrementPointer", AT, VM_1_N, Single;
    ROWS = (0x0028, 0x0010), "Rows", US, VM_1, Single;
    COLUMNS = (0x0028, 0x0011), "Columns", US, VM_1, Single;
    PIXEL_SPACING = (0x0028, 0x0030), "PixelSpacing", DS, VM_2, Single;
    PIXEL_ASPECT_RATIO = (0x0028, 0x0034), "PixelAspectRatio", IS, VM_2, Single;
    BITS_ALLOCATED = (0x0028, 0x0100), "BitsAllocated", US, VM_1, Single;
    BITS_STORED = (0x0028, 0x0101), "BitsStored", US, VM_1, Single;
    HIGH_BIT = (0x0028, 0x0102), "HighBit", US, VM_1, Single;
    PIXEL_REPRESENTATION = (0x0028, 0x0103), "PixelRepresentation", US, VM_1, Single;
    SMALLEST_IMAGE_PIXEL_VALUE = (0x0028, 0x0106), "SmallestImagePixelValue", US, VM_1, Single;
    LARGEST_IMAGE_PIXEL_VALUE = (0x0028, 0x0107), "LargestImagePixelValue", US, VM_1, Single;
    WINDOW_CENTER = (0x0028, 0x1050), "WindowCenter", DS, VM_1_N, Single;
    WINDOW_WIDTH = (0x0028, 0x1051), "WindowWidth", DS, VM_1_N, Single;
    RESCALE_INTERCEPT = (0x0028, 0x1052), "RescaleIntercept", DS, VM_1, Single;
    RESCALE_SLOPE = (0x0028, 0x1053), "RescaleSlope", DS, VM_1, Single;
    RESCALE_TYPE = (0x0028, 0x1054), "RescaleType", LO, VM_1, Single;
    WINDOW_CENTER_WIDTH_EXPLANATION = (0x0028, 0x1055), "WindowCenterWidthExplanation", LO, VM_1_N, Single;
    VOILUT_FUNCTION = (0x0028, 0x1056), "VOILUTFunction", CS, VM_1, Single;
    RED_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR = (0x0028, 0x1101), "RedPaletteColorLookupTableDescriptor", US, VM_3, Single;
    GREEN_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR = (0x0028, 0x1102), "GreenPaletteColorLookupTableDescriptor", US, VM_3, Single;
    BLUE_PALETTE_COLOR_LOOKUP_TABLE_DESCRIPTOR = (0x0028, 0x1103), "BluePaletteColorLookupTableDescriptor", US, VM_3, Single;
    RED_PALETTE_COLOR_LOOKUP_TABLE_DATA = (0x0028, 0x1201), "RedPaletteColorLookupTableData", OW, VM_1, Single;
    GREEN_PALETTE_COLOR_LOOKUP_TABLE_DATA = (0x0028, 0x1202), "GreenPaletteColorLookupTableData", OW, VM_1, Single;
    BLUE_PALETTE_COLOR_LOOKUP_TABLE_DATA = (0x0028, 0x1203), "BluePaletteColorLookupTableData", OW, VM_1, Single;
    LOSSY_IMAGE_COMPRESSION = (0x0028, 0x2110), "LossyImageCompression", CS, VM_1, Single;
    MODALITY_LUT_SEQUENCE = (0x0028, 0x3000), "ModalityLUTSequence", SQ, VM_1, Single;
    LUT_DESCRIPTOR = (0x0028, 0x3002), "LUTDescriptor", US, VM_3, Single;
    LUT_EXPLANATION = (0x0028, 0x3003), "LUTExplanation", LO, VM_1, Single;
    LUT_DATA = (0x0028, 0x3006), "LUTData", US, VM_1_N, Single;
    VOILUT_SEQUENCE = (0x0028, 0x3010), "VOILUTSequence", SQ, VM_1, Single;
    PIXEL_MEASURES_SEQUENCE = (0x0028, 0x9110), "PixelMeasuresSequence", SQ, VM_1, Single;
    FRAME_VOILUT_SEQUENCE = (0x0028, 0x9132), "FrameVOILUTSequence", SQ, VM_1, Single;
    PIXEL_VALUE_TRANSFORMATION_SEQUENCE = (0x0028, 0x9145), "PixelValueTransformationSequence", SQ, VM_1, Single;
    REQUESTING_PHYSICIAN = (0x0032, 0x1032), "RequestingPhysician", PN, VM_1, Single;
    REQUESTED_PROCEDURE_DESCRIPTION = (0x0032, 0x1060), "RequestedProcedureDescription", LO, VM_1, Single;
    PERFORMED_PROCEDURE_STEP_START_DATE = (0x0040, 0x0244), "PerformedProcedureStepStartDate", DA, VM_1, Single;
    PERFORMED_PROCEDURE_STEP_ID = (0x0040, 0x0253), "PerformedProcedureStepID", SH, VM_1, Single;
    PERFORMED_PROCEDURE_STEP_DESCRIPTION = (0x0040, 0x0254), "PerformedProcedureStepDescription", LO, VM_1, Single;
    REQUEST_ATTRIBUTES_SEQUENCE = (0x0040, 0x0275), "RequestAttributesSequence", SQ, VM_1, Single;
    CONTENT_SEQUENCE = (0x0040, 0xA730), "ContentSequence", SQ, VM_1, Single;
    NUMBER_OF_SLICES = (0x0054, 0x0081), "NumberOfSlices", US, VM_1, Single;
    UNITS = (0x0054, 0x1001), "Units", CS, VM_1, Single;
    ICON_IMAGE_SEQUENCE = (0x0088, 0x0200), "IconImageSequence", SQ, VM_1, Single;
    SHARED_FUNCTIONAL_GROUPS_SEQUENCE = (0x5200, 0x9229), "SharedFunctionalGroupsSequence", SQ, VM_1, Single;
    PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE = (0x5200, 0x9230), "PerFrameFunctionalGroupsSequence", SQ, VM_1, Single;
    FLOAT_PIXEL_DATA = (0x7FE0, 0x0008), "FloatPixelData", OF, VM_1, Single;
    DOUBLE_FLOAT_PIXEL_DATA = (0x7FE0, 0x0009), "DoubleFloatPixelData", OD, VM_1, Single;
    PIXEL_DATA = (0x7FE0, 0x0010), "PixelData", OW, VM_1, Single;
    DIGITAL_SIGNATURES_SEQUENCE = (0xFFFA, 0xFFFA), "DigitalSignaturesSequence", SQ, VM_1, Single;
    DATA_SET_TRAILING_PADDING = (0xFFFC, 0xFFFC), "DataSetTrailingPadding", OB, VM_1, Single;
    OVERLAY_ROWS = (0x6000, 0x0010), "OverlayRows", US, VM_1, Group100;
    OVERLAY_COLUMNS = (0x6000, 0x0011), "OverlayColumns", US, VM_1, Group100;
    OVERLAY_TYPE = (0x6000, 0x0040), "OverlayType", CS, VM_1, Group100;
    OVERLAY_ORIGIN = (0x6000, 0x0050), "OverlayOrigin", SS, VM_2, Group100;
    OVERLAY_BITS_ALLOCATED = (0x6000, 0x0100), "OverlayBitsAllocated", US, VM_1, Group100;
    OVERLAY_BIT_POSITION = (0x6000, 0x0102), "OverlayBitPosition", US, VM_1, Group100;
    OVERLAY_DATA = (0x6000, 0x3000), "OverlayData", OW, VM_1, Group100;
}
