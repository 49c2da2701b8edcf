//! 2D simplex noise for terrain heightmaps
//!
//! Stateless and deterministic: the same coordinates always produce the same
//! value. Output is clamped to [-1, 1] and is continuous everywhere.

/// Skew factor (sqrt(3) - 1) / 2
const F2: f32 = 0.366_025_4;
/// Unskew factor (3 - sqrt(3)) / 6
const G2: f32 = 0.211_324_87;
/// Scales the summed corner contributions into roughly [-1, 1]
const OUTPUT_SCALE: f32 = 40.0;

/// Reference permutation of 0..=255
const PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

fn perm(i: usize) -> usize {
    PERM[i & 255] as usize
}

/// Contribution of one simplex corner at offset (x, y) with gradient `hash`
fn corner(hash: usize, x: f32, y: f32) -> f32 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let t2 = t * t;
    t2 * t2 * gradient(hash, x, y)
}

/// Dot product with one of eight gradients picked by the low 3 bits of `hash`
fn gradient(hash: usize, x: f32, y: f32) -> f32 {
    let h = hash & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    let u = if h & 1 != 0 { -u } else { u };
    let v = if h & 2 != 0 { -2.0 * v } else { 2.0 * v };
    u + v
}

/// Sample simplex noise at (x, y)
pub fn generate(x: f32, y: f32) -> f32 {
    // Skew input space to find the containing simplex cell
    let s = (x + y) * F2;
    let i = (x + s).floor();
    let j = (y + s).floor();

    let t = (i + j) * G2;
    let x0 = x - (i - t);
    let y0 = y - (j - t);

    // Lower or upper triangle of the cell
    let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

    let x1 = x0 - i1 as f32 + G2;
    let y1 = y0 - j1 as f32 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let y2 = y0 - 1.0 + 2.0 * G2;

    // Wrap lattice coords into the permutation table
    let ii = (i as i64).rem_euclid(256) as usize;
    let jj = (j as i64).rem_euclid(256) as usize;

    let g0 = perm(ii + perm(jj));
    let g1 = perm(ii + i1 + perm(jj + j1));
    let g2 = perm(ii + 1 + perm(jj + 1));

    let sum = corner(g0, x0, y0) + corner(g1, x1, y1) + corner(g2, x2, y2);
    (OUTPUT_SCALE * sum).clamp(-1.0, 1.0)
}
