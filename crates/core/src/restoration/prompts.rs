//! Fixed instruction text sent with every restoration request.

use super::types::RestorationMode;

const STANDARD_INSTRUCTIONS: &str = "\
You are restoring a scanned or photographed old print.

1. Boundary detection: locate the edges of the physical photograph. Crop away \
everything outside them (scanner bed, table surface, album page, fingers, \
borders of other prints). Do not crop into the photograph itself.
2. Damage repair: remove scratches, creases, folds, tears, dust, mould spots, \
stains and silvering. Reconstruct missing areas so they blend with their \
surroundings.
3. Colour fidelity: keep the original colours and tonality. Do not colourise \
black-and-white or sepia images, do not shift hues, and do not add saturation \
that was not present.
4. Keep faces, clothing, text and composition exactly as they are. Do not add, \
remove or invent people or objects.

Return only the restored image.";

const ULTRA_INSTRUCTIONS: &str = "\
You are restoring and upscaling a scanned or photographed old print.

1. Strict boundary cropping: locate the exact edges of the physical photograph \
and crop away everything outside them. Do not crop into the photograph itself.
2. Damage repair: remove scratches, creases, folds, tears, dust, mould spots, \
stains and silvering. Reconstruct missing areas so they blend with their \
surroundings.
3. Super-resolution: reconstruct fine detail at the requested output \
resolution. Recover texture in skin, hair, fabric and foliage, sharpen edges \
without halos, and suppress film grain and scan noise without smearing detail.
4. Strict colour fidelity: preserve the original colours and tonality exactly. \
Do not shift hues, do not colourise monochrome or sepia images, and do not \
boost saturation or contrast.
5. Keep faces, clothing, text and composition exactly as they are. Do not add, \
remove or invent people or objects.

Return only the restored image.";

/// Instruction text for the given mode.
pub fn instructions_for(mode: RestorationMode) -> &'static str {
    match mode {
        RestorationMode::Standard => STANDARD_INSTRUCTIONS,
        RestorationMode::Ultra => ULTRA_INSTRUCTIONS,
    }
}
