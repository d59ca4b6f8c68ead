diesel::table! {
    games (id) {
        id -> Int8,
        map -> Text,
        mode -> Text,
        team1_score -> Int4,
        team2_score -> Int4,
        duration_minutes -> Nullable<Int4>,
        start_time -> Nullable<Timestamp>,
        end_time -> Timestamp,
    }
}

diesel::table! {
    game_events (id) {
        id -> Int8,
        game_id -> Int8,
        round_start_event_id -> Nullable<Int8>,
        event_type -> Int2,
        event_index -> Int4,
        timestamp -> Timestamp,
        round_number -> Nullable<Int4>,
        surviving_players -> Nullable<Jsonb>,
        killer_steam_id -> Nullable<Text>,
        killer_name -> Nullable<Text>,
        victim_steam_id -> Nullable<Text>,
        victim_name -> Nullable<Text>,
        weapon -> Nullable<Text>,
        is_headshot -> Nullable<Bool>,
        pos_x -> Nullable<Int4>,
        pos_y -> Nullable<Int4>,
        pos_z -> Nullable<Int4>,
        assister_steam_id -> Nullable<Text>,
        assister_name -> Nullable<Text>,
        assist_type -> Nullable<Int2>,
        attacker_steam_id -> Nullable<Text>,
        attacker_name -> Nullable<Text>,
        damage -> Nullable<Float4>,
        armor_damage -> Nullable<Float4>,
        hit_group -> Nullable<Text>,
        health_remaining -> Nullable<Int4>,
        bomb_player_steam_id -> Nullable<Text>,
        bomb_player_name -> Nullable<Text>,
        bomb_type -> Nullable<Int2>,
        bomb_time_remaining -> Nullable<Float4>,
    }
}

diesel::table! {
    accolades (id) {
        id -> Int8,
        game_id -> Int8,
        accolade_type -> Text,
        player_name -> Text,
        steam_id -> Nullable<Text>,
        value -> Float8,
        position -> Int4,
        score -> Float8,
    }
}

diesel::table! {
    player_stats (steam_id) {
        steam_id -> Text,
        name -> Text,
        kills -> Int8,
        deaths -> Int8,
        assists -> Int8,
        hs_kills -> Int8,
        rounds_played -> Int8,
        games_played -> Int8,
        damage -> Float8,
        rank -> Float8,
    }
}

diesel::joinable!(game_events -> games (game_id));
diesel::joinable!(accolades -> games (game_id));

diesel::allow_tables_to_appear_in_same_query!(games, game_events, accolades, player_stats,);
