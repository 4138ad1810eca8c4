use anyhow::{Result, anyhow};

use crate::player::EpisodeContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Title {
    pub id: &'static str,
    pub title: &'static str,
    pub other_name: &'static str,
    pub total_episodes: u32,
}

const TITLES: &[Title] = &[
    Title {
        id: "tien-nghich",
        title: "Tiên Nghịch",
        other_name: "Xian Ni",
        total_episodes: 128,
    },
    Title {
        id: "dau-pha-thuong-khung",
        title: "Đấu Phá Thương Khung",
        other_name: "Battle Through the Heavens",
        total_episodes: 156,
    },
    Title {
        id: "pham-nhan-tu-tien",
        title: "Phàm Nhân Tu Tiên",
        other_name: "A Record of a Mortal's Journey to Immortality",
        total_episodes: 142,
    },
    Title {
        id: "the-gioi-hoan-my",
        title: "Thế Giới Hoàn Mỹ",
        other_name: "Perfect World",
        total_episodes: 210,
    },
    Title {
        id: "kiem-lai",
        title: "Kiếm Lai",
        other_name: "Sword of Coming",
        total_episodes: 26,
    },
    Title {
        id: "than-lam-chi-chien",
        title: "Thần Lâm Chi Chiến",
        other_name: "Movie",
        total_episodes: 1,
    },
];

pub fn titles() -> &'static [Title] {
    TITLES
}

pub fn lookup(id: &str) -> Option<&'static Title> {
    TITLES.iter().find(|title| title.id == id)
}

/// Validates a watch target before any player state exists for it.
pub fn episode_context(id: &str, episode: u32) -> Result<(EpisodeContext, &'static Title)> {
    let title = lookup(id).ok_or_else(|| anyhow!("unknown title '{id}'"))?;
    let context = EpisodeContext::new(title.id, episode, title.total_episodes)
        .map_err(|err| anyhow!("cannot watch {}: {err}", title.title))?;
    Ok((context, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (idx, title) in TITLES.iter().enumerate() {
            assert!(
                TITLES[idx + 1..].iter().all(|other| other.id != title.id),
                "duplicate id {}",
                title.id
            );
            assert!(title.total_episodes >= 1);
        }
    }

    #[test]
    fn validates_episode_bounds() {
        let (context, title) = episode_context("tien-nghich", 128).expect("last episode valid");
        assert_eq!(context.total(), title.total_episodes);
        assert!(!context.has_next());

        assert!(episode_context("tien-nghich", 0).is_err());
        assert!(episode_context("tien-nghich", 129).is_err());
        assert!(episode_context("missing", 1).is_err());
    }
}
