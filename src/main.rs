use std::path::Path;

use anyhow::{Context, Result};
use menu_photographer::utils::logging;
use menu_photographer::{Config, Session};
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = match std::env::var("MENU_PHOTO_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("无法加载配置文件: {}", path))?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let session = Session::from_config(&config);
    session
        .ensure_authorized()
        .await
        .context("需要可用的 API Key 才能继续")?;

    let menu_text = read_menu_text(std::env::args().nth(1).as_deref()).await?;

    session.extract_dishes(&menu_text).await?;
    for dish in session.dishes() {
        info!("🍽️ {} - {}", dish.name, logging::truncate_text(&dish.description, 60));
    }

    let report = session.request_generate_all().await?;
    for (id, reason) in &report.failures {
        if let Some(dish) = session.dish(*id) {
            warn!("[{}] 生成失败: {}", dish.name, reason);
        }
    }

    // 可选：对所有生成成功的图片应用同一条编辑指令
    if let Ok(instruction) = std::env::var("EDIT_INSTRUCTION") {
        for dish in session.dishes().into_iter().filter(|d| d.has_image()) {
            if let Err(e) = session.request_edit(dish.id, &instruction).await {
                error!("[{}] 编辑失败，保留原图: {}", dish.name, e);
            }
        }
    }

    let saved = save_images(&session, Path::new(&config.output_dir)).await?;
    info!("\n图片已保存至: {} (共 {} 张)", config.output_dir, saved);

    Ok(())
}

/// 从文件读取菜单，没有传入路径时读取标准输入
async fn read_menu_text(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取菜单文件: {}", path)),
        None => {
            info!("📝 请输入菜单文本，以 EOF 结束...");
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("无法读取标准输入")?;
            Ok(text)
        }
    }
}

async fn save_images(session: &Session, output_dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    let mut saved = 0;
    for dish in session.dishes() {
        let Some(image) = &dish.image else {
            continue;
        };
        let bytes = image
            .decode_bytes()
            .with_context(|| format!("无法解码图片: {}", dish.name))?;
        let path = output_dir.join(image.download_file_name(&dish.name));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("写入图片失败: {}", path.display()))?;
        info!("💾 {}", path.display());
        saved += 1;
    }
    Ok(saved)
}
