// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

// 数据集准备全流程: 展平图片 → VOC 转 YOLO → 写数据集描述 → 读回标签

use std::fs;
use std::path::Path;

use steel_qc::dataset::{
    annotation_dirs_for, convert_folders, flatten_splits, list_images, parse_label_file, DataYaml,
};
use steel_qc::visualize::label_path_for;
use steel_qc::ProjectConfig;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn annotation(filename: &str, name: &str, bbox: (u32, u32, u32, u32)) -> String {
    let (x0, y0, x1, y1) = bbox;
    format!(
        "<annotation><filename>{filename}</filename>\
         <size><width>200</width><height>200</height><depth>1</depth></size>\
         <object><name>{name}</name><difficult>0</difficult>\
         <bndbox><xmin>{x0}</xmin><ymin>{y0}</ymin><xmax>{x1}</xmax><ymax>{y1}</ymax></bndbox>\
         </object></annotation>"
    )
}

#[test]
fn test_prepare_neu_layout() {
    let root = tempfile::tempdir().unwrap();
    let config = ProjectConfig {
        dataset_root: root.path().to_path_buf(),
        ..Default::default()
    };

    for (split, class, stem) in [
        ("train", "crazing", "crazing_1"),
        ("train", "patches", "patches_7"),
        ("validation", "scratches", "scratches_3"),
    ] {
        let images = config.split_dir(split, "images");
        write(&images.join(class).join(format!("{stem}.jpg")), "jpg");
        write(
            &config.split_dir(split, "annotations").join(format!("{stem}.xml")),
            &annotation(&format!("{stem}.jpg"), class, (40, 60, 120, 100)),
        );
    }

    let flat = flatten_splits(&config.dataset_root, &config.splits).unwrap();
    assert_eq!(flat.moved, 3);
    assert_eq!(flat.removed_dirs, 3);
    assert!(flat.collisions.is_empty());

    let dirs = annotation_dirs_for(&config.dataset_root, &config.splits);
    let report = convert_folders(&dirs, &config.dataset_root, &config.class_names).unwrap();
    assert_eq!(report.folders, 2);
    assert_eq!(report.files, 3);
    assert_eq!(report.objects, 3);
    assert_eq!(report.skipped_objects, 0);

    // 每张图片都能找到对应标签
    let train_images = list_images(&config.split_dir("train", "images")).unwrap();
    assert_eq!(train_images.len(), 2);
    let train_labels = config.split_dir("train", "labels");
    for image in &train_images {
        let labels = parse_label_file(label_path_for(image, &train_labels)).unwrap();
        assert_eq!(labels.len(), 1);
    }

    let patches = parse_label_file(train_labels.join("patches_7.txt")).unwrap();
    assert_eq!(patches[0].class_id, 2);
    assert_eq!(patches[0].to_string(), "2 0.400000 0.400000 0.400000 0.200000");

    let yaml_path = root.path().join("NEU-defects.yaml");
    DataYaml::from_config(&config).write(&yaml_path).unwrap();
    let yaml = fs::read_to_string(&yaml_path).unwrap();
    assert!(yaml.contains("train: 'train/images'"));
    assert!(yaml.contains("val: 'validation/images'"));
    assert!(yaml.contains("  5: 'scratches'"));
}

#[test]
fn test_flatten_twice_is_noop() {
    let root = tempfile::tempdir().unwrap();
    let splits = vec!["train".to_string()];
    write(&root.path().join("train/images/inclusion/inclusion_1.jpg"), "x");

    assert_eq!(flatten_splits(root.path(), &splits).unwrap().moved, 1);
    let again = flatten_splits(root.path(), &splits).unwrap();
    assert_eq!(again.moved, 0);
    assert_eq!(again.removed_dirs, 0);
    assert!(root.path().join("train/images/inclusion_1.jpg").exists());
}
