use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrlogo::{generate, mask, qr, qrencode, ErrorCorrectionLevel, Mode, RgbaImage};

fn text_for_version(version: u8) -> Vec<u8> {
    let len = qr::data_capacity(version, Mode::EightBit, ErrorCorrectionLevel::M);
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

fn bench_encode_small(c: &mut Criterion) {
    let text = text_for_version(2);
    c.bench_function("encode_v2_m", |b| b.iter(|| qrencode::encode(black_box(&text), ErrorCorrectionLevel::M)));
}

fn bench_encode_large(c: &mut Criterion) {
    let text = text_for_version(40);
    c.bench_function("encode_v40_m", |b| b.iter(|| qrencode::encode(black_box(&text), ErrorCorrectionLevel::M)));
}

fn bench_mask_select(c: &mut Criterion) {
    let code = qrencode::encode(&text_for_version(20), ErrorCorrectionLevel::M).unwrap();
    let mut unmasked = code.matrix().clone();
    unmasked.apply_mask(code.mask());
    c.bench_function("mask_select_v20", |b| b.iter(|| mask::select(black_box(&unmasked), ErrorCorrectionLevel::M)));
}

fn bench_generate_with_logo(c: &mut Criterion) {
    let logo = RgbaImage::from_pixel(256, 256, qrlogo::Rgba([200, 30, 30, 255]));
    c.bench_function("generate_logo_h", |b| {
        b.iter(|| {
            generate(
                black_box("https://qrlogo.kaarposoft.dk/ with a logo in the middle of the symbol"),
                ErrorCorrectionLevel::H,
                black_box(8),
                Some(&logo),
                None,
            )
        })
    });
}

criterion_group!(benches, bench_encode_small, bench_encode_large, bench_mask_select, bench_generate_with_logo);
criterion_main!(benches);
